//! Per-thread diagnostic state.
//!
//! Each thread owns, per dispatcher instance, an ordered error list, a lazily
//! materialized crash-log text mirror, and the count of live error marks.
//! Storage is a `thread_local!` map keyed by dispatcher id: the hot path
//! never touches shared memory, the state drops with its thread, and
//! independent dispatcher instances (as used by tests) are fully isolated.

use std::cell::RefCell;
use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::record::DiagnosticRecord;

/// Crash-log text mirror of one thread's error list.
///
/// `text` always equals the concatenated rendering of the current list, one
/// line per record. Per-record end offsets are kept so an erase of the tail
/// can truncate in place; an interior erase rebuilds the whole mirror.
pub(crate) struct LogText {
    text: String,
    ends: Vec<usize>,
}

impl LogText {
    pub(crate) const fn new() -> Self {
        LogText {
            text: String::new(),
            ends: Vec::new(),
        }
    }

    /// Append one rendered record.
    pub(crate) fn append(&mut self, record: &DiagnosticRecord) {
        // Formatting into a String cannot fail.
        let _ = writeln!(self.text, "{record}");
        self.ends.push(self.text.len());
    }

    /// Keep only the first `keep` records' worth of text.
    pub(crate) fn truncate_records(&mut self, keep: usize) {
        let end = if keep == 0 { 0 } else { self.ends[keep - 1] };
        self.text.truncate(end);
        self.ends.truncate(keep);
    }

    /// Re-render the mirror from scratch.
    pub(crate) fn rebuild(&mut self, records: &[DiagnosticRecord]) {
        self.text.clear();
        self.ends.clear();
        for record in records {
            self.append(record);
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }
}

/// Diagnostic state owned by one thread for one dispatcher instance.
pub(crate) struct ThreadState {
    /// Pending errors, in serial order.
    pub(crate) errors: Vec<DiagnosticRecord>,
    /// Crash-log mirror; materialized on first append.
    pub(crate) log_text: Option<LogText>,
    /// Number of live error marks on this thread.
    pub(crate) mark_depth: usize,
}

impl ThreadState {
    fn new() -> Self {
        ThreadState {
            errors: Vec::new(),
            log_text: None,
            mark_depth: 0,
        }
    }

    /// Append a record (serial already assigned) and mirror it into the
    /// crash-log text.
    pub(crate) fn append(&mut self, record: DiagnosticRecord) {
        self.log_text.get_or_insert_with(LogText::new).append(&record);
        self.errors.push(record);
    }

    /// Index of the first record with serial >= `serial`.
    ///
    /// The list is serial-ordered by invariant, so this is a binary search.
    pub(crate) fn first_at_or_after(&self, serial: u64) -> usize {
        self.errors.partition_point(|r| r.serial() < serial)
    }

    /// Current crash-log text, cloned for publication.
    pub(crate) fn log_snapshot(&self) -> String {
        self.log_text
            .as_ref()
            .map_or_else(String::new, |log| log.as_str().to_owned())
    }
}

thread_local! {
    static STATES: RefCell<FxHashMap<u64, ThreadState>> =
        RefCell::new(FxHashMap::default());
}

/// Run `f` with the calling thread's state for the dispatcher `mgr_id`,
/// creating it on first touch.
pub(crate) fn with_state<R>(mgr_id: u64, f: impl FnOnce(&mut ThreadState) -> R) -> R {
    STATES.with(|states| {
        let mut map = states.borrow_mut();
        f(map.entry(mgr_id).or_insert_with(ThreadState::new))
    })
}

#[cfg(test)]
mod tests;
