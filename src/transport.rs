//! Cross-thread error hand-off.
//!
//! Errors posted off the main thread never enter an error stream on their
//! own; a worker that wants its errors observed collects them into an
//! [`ErrorTransport`] and sends it to a consuming thread, which posts it
//! into its own stream. Posting reassigns every serial in order, so the
//! installed records sort after everything the destination had already seen
//! and interact correctly with that thread's error marks.

use crate::mgr::DiagnosticMgr;
use crate::record::DiagnosticRecord;

/// Movable container carrying an ordered slice of one thread's errors to
/// another thread's stream.
#[derive(Default)]
pub struct ErrorTransport {
    records: Vec<DiagnosticRecord>,
}

impl ErrorTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        ErrorTransport::default()
    }

    pub(crate) fn from_records(records: Vec<DiagnosticRecord>) -> Self {
        ErrorTransport { records }
    }

    /// Collect a record directly, e.g. on a worker thread where posting to
    /// the dispatcher would only reach stderr. Order of collection is
    /// preserved at the destination.
    pub fn add(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }

    /// Whether the transport carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of carried records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Splice the carried records into the calling thread's error stream,
    /// reassigning their serials in order and republishing that thread's
    /// crash log. The transport is left empty.
    pub fn post(&mut self, mgr: &DiagnosticMgr) {
        mgr.splice_errors(&mut self.records);
    }
}

#[cfg(test)]
mod tests;
