//! The diagnostic dispatcher.
//!
//! [`DiagnosticMgr`] is the single coordination point through which every
//! error, warning, status message, and fatal condition flows. Errors posted
//! on the main thread accumulate in that thread's stream, where
//! [`crate::ErrorMark`] regions can inspect and drain them; all diagnostics
//! can additionally be routed to a registered [`Delegate`], and fall back to
//! a one-line stderr rendering otherwise.
//!
//! # Threading
//!
//! Every operation is safe to call from any thread. Each thread's error
//! stream is private to that thread; the only cross-thread synchronization
//! on the post path is the serial counter. Delegate callbacks and error
//! storage happen only on the main thread — the thread that constructed the
//! dispatcher — because delegates typically bridge into interpreters or UI
//! layers that are not thread-safe. Worker-thread errors either go straight
//! to stderr or are handed to the main thread via [`crate::ErrorTransport`].

use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};

use parking_lot::RwLock;

use crate::crashlog::{CrashLogSink, ProcessCrashLog};
use crate::notice::NoticeSink;
use crate::record::{CallContext, DiagnosticInfo, DiagnosticKind, DiagnosticRecord};
use crate::serial::SerialAllocator;
use crate::sink::{self, SharedSink};
use crate::state;
use crate::transport::ErrorTransport;
use crate::DiagnosticCode;

/// Capability receiver for diagnostics. At most one is installed per
/// dispatcher, held weakly: the dispatcher does not own the delegate's
/// lifetime, and a dead handle is treated as "no delegate".
///
/// All callbacks run synchronously on the main thread.
pub trait Delegate: Send + Sync {
    /// An error was posted and is already visible in the main thread's
    /// error stream.
    fn issue_error(&self, record: &DiagnosticRecord);

    /// A warning was posted. The record is not stored.
    fn issue_warning(&self, record: &DiagnosticRecord);

    /// A status message was posted. The record is not stored.
    fn issue_status(&self, record: &DiagnosticRecord);

    /// A fatal diagnostic was posted. Expected not to return; a delegate
    /// that has finished its own logging should call [`unhandled_abort`].
    /// If this does return, the dispatcher aborts the process itself.
    fn issue_fatal(&self, context: &CallContext, msg: &str);
}

/// Terminate the process without re-entering any session-logging mechanism.
///
/// For fatal paths where everything worth logging has already been logged.
pub fn unhandled_abort() -> ! {
    std::process::abort()
}

/// Position in the calling thread's error stream.
///
/// A cursor denotes the first record whose serial is >= its saved serial;
/// because the stream is serial-ordered, cursors are stable lower bounds
/// that survive erasure of other ranges in the same stream. Cursors from
/// one thread's stream are meaningless on another thread.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ErrorCursor {
    serial: u64,
}

impl ErrorCursor {
    pub(crate) const fn at(serial: u64) -> Self {
        ErrorCursor { serial }
    }

    /// The serial lower bound this cursor denotes.
    pub const fn serial(&self) -> u64 {
        self.serial
    }
}

static INSTANCE: OnceLock<DiagnosticMgr> = OnceLock::new();

/// Singleton dispatcher through which all diagnostics pass.
pub struct DiagnosticMgr {
    /// Instance key for the per-thread state map.
    id: u64,
    /// The thread that constructed this instance; the only thread on which
    /// errors are stored and delegate callbacks run.
    main_thread: ThreadId,
    allocator: SerialAllocator,
    delegate: RwLock<Option<Weak<dyn Delegate>>>,
    quiet: AtomicBool,
    sink: RwLock<SharedSink>,
    crash_sink: RwLock<Arc<dyn CrashLogSink>>,
    notice_sink: RwLock<Option<Arc<dyn NoticeSink>>>,
}

impl Default for DiagnosticMgr {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticMgr {
    /// Return the process-wide singleton, constructing it on first call.
    ///
    /// The first calling thread becomes the main thread for the lifetime of
    /// the process.
    pub fn get() -> &'static DiagnosticMgr {
        INSTANCE.get_or_init(DiagnosticMgr::new)
    }

    /// Create an independent dispatcher whose main thread is the calling
    /// thread. Production code uses [`get`]; independent instances exist so
    /// tests can run isolated from the singleton.
    ///
    /// [`get`]: DiagnosticMgr::get
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        DiagnosticMgr {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            main_thread: thread::current().id(),
            allocator: SerialAllocator::new(),
            delegate: RwLock::new(None),
            quiet: AtomicBool::new(false),
            sink: RwLock::new(sink::stderr_sink()),
            crash_sink: RwLock::new(Arc::new(ProcessCrashLog::new())),
            notice_sink: RwLock::new(None),
        }
    }

    /// Whether the calling thread is this dispatcher's main thread.
    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.main_thread
    }

    /// Install or clear the delegate.
    ///
    /// Replacing a delegate that is still alive posts an internal warning
    /// through the normal warning path; clearing an empty or dead slot is
    /// silent.
    pub fn set_delegate(&self, delegate: Option<Weak<dyn Delegate>>) {
        let previous = {
            let mut slot = self.delegate.write();
            std::mem::replace(&mut *slot, delegate)
        };
        if previous.and_then(|weak| weak.upgrade()).is_some() {
            self.post_warning(
                DiagnosticCode::Warning,
                DiagnosticCode::Warning.name(),
                CallContext::new(
                    file!(),
                    line!(),
                    concat!(module_path!(), "::set_delegate"),
                ),
                "replacing an installed diagnostic delegate",
                DiagnosticInfo::none(),
                false,
            );
        }
    }

    /// Suppress stderr printing of non-fatal diagnostics.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Release);
    }

    /// Replace the output sink for rendered diagnostics.
    pub fn set_sink(&self, sink: SharedSink) {
        *self.sink.write() = sink;
    }

    /// Replace the crash-log sink.
    pub fn set_crash_log_sink(&self, sink: Arc<dyn CrashLogSink>) {
        *self.crash_sink.write() = sink;
    }

    /// Install or clear the error-posted notice sink.
    pub fn set_notice_sink(&self, sink: Option<Arc<dyn NoticeSink>>) {
        *self.notice_sink.write() = sink;
    }

    /// Post an error.
    ///
    /// On the main thread the record is appended to the calling thread's
    /// error stream, the crash log is republished, and the record is routed
    /// to the delegate (or stderr); `Some` cursor to the appended record is
    /// returned. On any other thread the record is printed to stderr
    /// unconditionally, not stored, not delegated, and `None` is returned.
    pub fn post_error(
        &self,
        code: DiagnosticCode,
        code_name: &'static str,
        context: CallContext,
        commentary: impl Into<String>,
        info: DiagnosticInfo,
        quiet: bool,
    ) -> Option<ErrorCursor> {
        let mut record = DiagnosticRecord::new(
            DiagnosticKind::Error,
            code,
            code_name,
            context,
            commentary,
            info,
        )
        .with_quiet(quiet);
        record.set_serial(self.allocator.next());

        if !self.is_main_thread() {
            // Off-main errors are preserved only via ErrorTransport.
            self.print_line(&record.to_string());
            return None;
        }

        let cursor = ErrorCursor::at(record.serial());
        let log = state::with_state(self.id, |st| {
            st.append(record.clone());
            st.log_snapshot()
        });
        self.publish_crash_log(&log);
        tracing::trace!(serial = record.serial(), "error posted");

        if let Some(delegate) = self.upgrade_delegate() {
            delegate.issue_error(&record);
        } else if !self.is_quiet() && !record.is_quiet() {
            self.print_line(&record.to_string());
        }

        let notice = self.notice_sink.read().clone();
        if let Some(notice) = notice {
            notice.error_posted(&record);
        }

        Some(cursor)
    }

    /// Append a pre-built error record to the calling thread's stream with a
    /// fresh serial, bypassing delegate and notice delivery.
    ///
    /// This is the hook for subsystems that translate errors to and from
    /// another error mechanism (e.g. interpreter exceptions). Off the main
    /// thread the record goes to stderr instead, like [`post_error`].
    ///
    /// [`post_error`]: DiagnosticMgr::post_error
    pub fn append_error(&self, mut record: DiagnosticRecord) -> Option<ErrorCursor> {
        record.set_serial(self.allocator.next());

        if !self.is_main_thread() {
            self.print_line(&record.to_string());
            return None;
        }

        let cursor = ErrorCursor::at(record.serial());
        let log = state::with_state(self.id, |st| {
            st.append(record);
            st.log_snapshot()
        });
        self.publish_crash_log(&log);
        Some(cursor)
    }

    /// Post a warning. Delivered to the delegate on the main thread;
    /// printed to stderr otherwise, unless suppressed by a quiet flag.
    pub fn post_warning(
        &self,
        code: DiagnosticCode,
        code_name: &'static str,
        context: CallContext,
        commentary: impl Into<String>,
        info: DiagnosticInfo,
        quiet: bool,
    ) {
        let record = self.stamped(
            DiagnosticKind::Warning,
            code,
            code_name,
            context,
            commentary,
            info,
            quiet,
        );
        if let Some(delegate) = self.main_thread_delegate() {
            delegate.issue_warning(&record);
        } else if !self.is_quiet() && !record.is_quiet() {
            self.print_line(&record.to_string());
        }
    }

    /// Post a status message. Delivered to the delegate on the main thread;
    /// printed to stderr otherwise, unless suppressed by a quiet flag.
    pub fn post_status(
        &self,
        code: DiagnosticCode,
        code_name: &'static str,
        context: CallContext,
        commentary: impl Into<String>,
        info: DiagnosticInfo,
        quiet: bool,
    ) {
        let record = self.stamped(
            DiagnosticKind::Status,
            code,
            code_name,
            context,
            commentary,
            info,
            quiet,
        );
        if let Some(delegate) = self.main_thread_delegate() {
            delegate.issue_status(&record);
        } else if !self.is_quiet() && !record.is_quiet() {
            self.print_line(&record.to_string());
        }
    }

    /// Post a fatal diagnostic and terminate the process.
    ///
    /// The rendering and a best-effort stack trace are always printed,
    /// regardless of quiet flags. On the main thread a registered delegate
    /// gets [`Delegate::issue_fatal`] first and is expected not to return;
    /// whether it returns or no delegate exists, the process aborts without
    /// re-entering any session-logging mechanism.
    pub fn post_fatal(&self, context: CallContext, code: DiagnosticCode, msg: &str) -> ! {
        let record = DiagnosticRecord::new(
            DiagnosticKind::Fatal,
            code,
            code.name(),
            context,
            msg,
            DiagnosticInfo::none(),
        );
        self.print_line(&record.to_string());
        self.print_line(&format!("stack trace:\n{}", Backtrace::force_capture()));

        if self.is_main_thread() {
            if let Some(delegate) = self.upgrade_delegate() {
                delegate.issue_fatal(&context, msg);
            }
        }
        unhandled_abort()
    }

    /// Cursor to the first record in the calling thread's error stream, or
    /// [`error_end`] if the stream is empty.
    ///
    /// [`error_end`]: DiagnosticMgr::error_end
    pub fn error_begin(&self) -> ErrorCursor {
        state::with_state(self.id, |st| {
            st.errors
                .first()
                .map_or_else(|| self.error_end(), |r| ErrorCursor::at(r.serial()))
        })
    }

    /// Past-the-end cursor of the calling thread's error stream.
    pub fn error_end(&self) -> ErrorCursor {
        ErrorCursor::at(self.allocator.peek_next())
    }

    /// Remove `[first, last)` from the calling thread's error stream and
    /// republish the crash log. Returns the cursor at `last`'s position.
    ///
    /// A tail erase truncates the crash-log text in place; an interior erase
    /// leaves the remaining serials non-contiguous, so the text is rebuilt.
    pub fn erase_range(&self, first: ErrorCursor, last: ErrorCursor) -> ErrorCursor {
        let log = state::with_state(self.id, |st| {
            let lo = st.first_at_or_after(first.serial());
            let hi = st.first_at_or_after(last.serial());
            if lo >= hi {
                return None;
            }
            let tail = hi == st.errors.len();
            st.errors.drain(lo..hi);
            match st.log_text.as_mut() {
                Some(log) if tail => log.truncate_records(lo),
                Some(log) => log.rebuild(&st.errors),
                None => {}
            }
            Some(st.log_snapshot())
        });
        if let Some(text) = log {
            self.publish_crash_log(&text);
        }
        last
    }

    /// Snapshot of the records in `[first, last)` of the calling thread's
    /// error stream, in order.
    pub fn errors_in(&self, first: ErrorCursor, last: ErrorCursor) -> Vec<DiagnosticRecord> {
        state::with_state(self.id, |st| {
            let lo = st.first_at_or_after(first.serial());
            let hi = st.first_at_or_after(last.serial());
            st.errors[lo..hi.max(lo)].to_vec()
        })
    }

    /// Number of records in `[first, last)` of the calling thread's stream.
    pub fn error_count_in(&self, first: ErrorCursor, last: ErrorCursor) -> usize {
        state::with_state(self.id, |st| {
            let lo = st.first_at_or_after(first.serial());
            let hi = st.first_at_or_after(last.serial());
            hi.saturating_sub(lo)
        })
    }

    /// Move `[first, last)` out of the calling thread's error stream into a
    /// transport, republishing the crash log. The transported records keep
    /// their order; their serials are reassigned when the transport is
    /// posted at the destination.
    pub fn take_errors(&self, first: ErrorCursor, last: ErrorCursor) -> ErrorTransport {
        let (taken, log) = state::with_state(self.id, |st| {
            let lo = st.first_at_or_after(first.serial());
            let hi = st.first_at_or_after(last.serial());
            if lo >= hi {
                return (Vec::new(), None);
            }
            let tail = hi == st.errors.len();
            let taken: Vec<DiagnosticRecord> = st.errors.drain(lo..hi).collect();
            match st.log_text.as_mut() {
                Some(log) if tail => log.truncate_records(lo),
                Some(log) => log.rebuild(&st.errors),
                None => {}
            }
            (taken, Some(st.log_snapshot()))
        });
        if let Some(text) = log {
            self.publish_crash_log(&text);
        }
        ErrorTransport::from_records(taken)
    }

    /// Open an [`crate::ErrorMark`] over the calling thread's error stream.
    pub fn mark(&self) -> crate::ErrorMark<'_> {
        crate::ErrorMark::create(self)
    }

    /// Whether the calling thread has a live [`crate::ErrorMark`].
    pub fn has_active_error_mark(&self) -> bool {
        state::with_state(self.id, |st| st.mark_depth > 0)
    }

    // Splice records into the calling thread's stream, reassigning serials
    // in order so the spliced records sort after everything already there.
    pub(crate) fn splice_errors(&self, src: &mut Vec<DiagnosticRecord>) {
        if src.is_empty() {
            return;
        }
        let log = state::with_state(self.id, |st| {
            for mut record in src.drain(..) {
                record.set_serial(self.allocator.next());
                st.append(record);
            }
            st.log_snapshot()
        });
        self.publish_crash_log(&log);
    }

    // Invoked by ErrorMark construction.
    pub(crate) fn create_error_mark(&self) {
        state::with_state(self.id, |st| st.mark_depth += 1);
    }

    // Invoked by ErrorMark destruction. True if this was the last mark.
    pub(crate) fn destroy_error_mark(&self) -> bool {
        state::with_state(self.id, |st| {
            st.mark_depth -= 1;
            st.mark_depth == 0
        })
    }

    pub(crate) fn serial_peek(&self) -> u64 {
        self.allocator.peek_next()
    }

    fn stamped(
        &self,
        kind: DiagnosticKind,
        code: DiagnosticCode,
        code_name: &'static str,
        context: CallContext,
        commentary: impl Into<String>,
        info: DiagnosticInfo,
        quiet: bool,
    ) -> DiagnosticRecord {
        let mut record =
            DiagnosticRecord::new(kind, code, code_name, context, commentary, info)
                .with_quiet(quiet);
        record.set_serial(self.allocator.next());
        record
    }

    fn is_quiet(&self) -> bool {
        self.quiet.load(Ordering::Acquire)
    }

    fn upgrade_delegate(&self) -> Option<Arc<dyn Delegate>> {
        self.delegate.read().as_ref().and_then(Weak::upgrade)
    }

    // Delegate handle, but only if the calling thread is the main thread.
    fn main_thread_delegate(&self) -> Option<Arc<dyn Delegate>> {
        if self.is_main_thread() {
            self.upgrade_delegate()
        } else {
            None
        }
    }

    fn print_line(&self, line: &str) {
        let sink = self.sink.read().clone();
        sink.write_line(line);
    }

    fn publish_crash_log(&self, text: &str) {
        let sink = self.crash_sink.read().clone();
        sink.set_extra_log_info_for_errors(text);
    }
}
