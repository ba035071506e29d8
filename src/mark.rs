//! Scoped error marks.
//!
//! An [`ErrorMark`] delimits a region of the calling thread's error stream:
//! every error posted on this thread during the mark's lifetime has a serial
//! at or above the mark's snapshot. Marks nest; each one sees its own
//! suffix. A mark never cleans up after itself — errors still pending when
//! it drops stay in the stream for an enclosing mark or the caller to drain.

use std::marker::PhantomData;

use crate::mgr::{DiagnosticMgr, ErrorCursor};
use crate::record::DiagnosticRecord;
use crate::transport::ErrorTransport;

/// Stack-scoped token over the suffix of the current thread's error stream.
///
/// Bound to the thread it was constructed on (`!Send`); dropping it on
/// another thread is ruled out at compile time.
pub struct ErrorMark<'mgr> {
    mgr: &'mgr DiagnosticMgr,
    saved_serial: u64,
    // Binds the mark to its construction thread.
    _not_send: PhantomData<*const ()>,
}

impl ErrorMark<'static> {
    /// Open a mark on the singleton dispatcher.
    pub fn new() -> Self {
        DiagnosticMgr::get().mark()
    }
}

impl Default for ErrorMark<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'mgr> ErrorMark<'mgr> {
    pub(crate) fn create(mgr: &'mgr DiagnosticMgr) -> Self {
        mgr.create_error_mark();
        let saved_serial = mgr.serial_peek();
        tracing::trace!(saved_serial, "error mark created");
        ErrorMark {
            mgr,
            saved_serial,
            _not_send: PhantomData,
        }
    }

    /// True iff no error has entered this thread's stream since the mark
    /// was opened.
    pub fn is_clean(&self) -> bool {
        self.mgr.error_count_in(self.begin(), self.end()) == 0
    }

    /// Cursor to the first record in the mark's region, or [`end`] if the
    /// region is empty.
    ///
    /// [`end`]: ErrorMark::end
    pub fn begin(&self) -> ErrorCursor {
        ErrorCursor::at(self.saved_serial)
    }

    /// Past-the-end cursor of the owning thread's error stream.
    pub fn end(&self) -> ErrorCursor {
        self.mgr.error_end()
    }

    /// Number of errors in the mark's region.
    pub fn error_count(&self) -> usize {
        self.mgr.error_count_in(self.begin(), self.end())
    }

    /// Snapshot of the errors in the mark's region, in serial order.
    pub fn errors(&self) -> Vec<DiagnosticRecord> {
        self.mgr.errors_in(self.begin(), self.end())
    }

    /// Erase the mark's region from the owning thread's stream.
    pub fn clear(&self) {
        self.mgr.erase_range(self.begin(), self.end());
    }

    /// Move the mark's region into a transport for hand-off to another
    /// thread, leaving the region empty.
    pub fn transport(&self) -> ErrorTransport {
        self.mgr.take_errors(self.begin(), self.end())
    }
}

impl Drop for ErrorMark<'_> {
    fn drop(&mut self) {
        let was_last = self.mgr.destroy_error_mark();
        tracing::trace!(
            saved_serial = self.saved_serial,
            was_last,
            "error mark destroyed"
        );
    }
}

#[cfg(test)]
mod tests;
