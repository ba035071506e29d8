//! Process-wide diagnostic dispatcher.
//!
//! Every error, warning, status message, and fatal condition in the host
//! process flows through one [`DiagnosticMgr`]. Two usage modes coexist:
//!
//! - **Stream-style**: recoverable errors accumulate in a per-thread list.
//!   Callers open an [`ErrorMark`] around a code region, then inspect,
//!   drain, or hand off whatever errors the region produced.
//! - **Callback-style**: a registered [`Delegate`] receives every
//!   diagnostic for logging or translation into another error mechanism.
//!   Diagnostics with no delegate fall back to one-line stderr rendering.
//!
//! Errors are stored and delegates invoked only on the main thread — the
//! thread that first touched the dispatcher — because delegates typically
//! bridge into interpreters or UI layers that are not thread-safe. Worker
//! threads print to stderr, or hand their errors to a consuming thread with
//! an [`ErrorTransport`]:
//!
//! ```no_run
//! use diagmgr::{diag_error, DiagnosticCode, ErrorMark};
//!
//! let mark = ErrorMark::new();
//! diag_error!(DiagnosticCode::RuntimeError, "asset {} not found", "ground.png");
//! if !mark.is_clean() {
//!     for err in mark.errors() {
//!         eprintln!("pending: {}", err.commentary());
//!     }
//!     mark.clear();
//! }
//! ```
//!
//! While errors are pending, their textual rendering is mirrored into the
//! crash handler's extra-info slot (see [`crashlog`]) so an abort still
//! gets them into the crash report.

mod code;
pub mod crashlog;
mod macros;
mod mark;
mod mgr;
pub mod notice;
mod record;
mod serial;
pub mod sink;
mod state;
mod transport;

pub use code::DiagnosticCode;
pub use crashlog::{CrashLogSink, ProcessCrashLog};
pub use mark::ErrorMark;
pub use mgr::{unhandled_abort, Delegate, DiagnosticMgr, ErrorCursor};
pub use notice::NoticeSink;
pub use record::{CallContext, DiagnosticInfo, DiagnosticKind, DiagnosticRecord};
pub use sink::{buffer_sink, stderr_sink, BufferSink, SharedSink, SinkImpl, StderrSink};
pub use transport::ErrorTransport;
