//! Crash-log publication.
//!
//! While errors are pending in a thread's stream, their textual rendering is
//! mirrored into the crash handler's "extra info" slot so that an abort with
//! errors outstanding still gets them into the crash report. The handler is
//! behind a trait so tests can substitute a capturing sink.

use parking_lot::Mutex;

/// Receiver for the per-thread crash-log text.
///
/// Called with the full current text on every mutation of a thread's error
/// stream: append, tail truncate, or interior rebuild.
pub trait CrashLogSink: Send + Sync {
    /// Replace the pending-errors text attached to crash reports.
    fn set_extra_log_info_for_errors(&self, text: &str);
}

/// Default sink: holds the most recently published text in process memory,
/// where a crash handler can collect it.
#[derive(Default)]
pub struct ProcessCrashLog {
    text: Mutex<String>,
    publishes: Mutex<usize>,
}

impl ProcessCrashLog {
    /// Create an empty crash-log store.
    pub fn new() -> Self {
        ProcessCrashLog::default()
    }

    /// The most recently published text.
    pub fn current(&self) -> String {
        self.text.lock().clone()
    }

    /// How many times text has been published, including empty publishes.
    pub fn publishes(&self) -> usize {
        *self.publishes.lock()
    }
}

impl CrashLogSink for ProcessCrashLog {
    fn set_extra_log_info_for_errors(&self, text: &str) {
        let mut slot = self.text.lock();
        slot.clear();
        slot.push_str(text);
        *self.publishes.lock() += 1;
    }
}
