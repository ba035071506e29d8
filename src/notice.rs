//! Error-posted notice emission.
//!
//! When an error is delivered on the main thread, the dispatcher publishes a
//! notice so observers (UI layers, session logs) can react without being the
//! registered delegate. The bus is an external collaborator; this module
//! only defines the seam the dispatcher publishes through.

use crate::DiagnosticRecord;

/// Observer notified after an error is appended on the main thread.
///
/// The record is already visible in the calling thread's error stream when
/// the sink runs. Sinks are invoked synchronously on the posting thread and
/// must not post diagnostics themselves.
pub trait NoticeSink: Send + Sync {
    /// An error was posted and appended on the main thread.
    fn error_posted(&self, record: &DiagnosticRecord);
}
