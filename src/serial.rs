//! Process-wide serial number allocation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free allocator of strictly monotonic ordering stamps.
///
/// Serials are used only for ordering comparisons, never for indexing.
/// Allocation is a single atomic increment; concurrent callers observe a
/// total order consistent with the order in which their increments landed.
/// Serials start at 1 so that 0 can mean "not yet assigned".
pub(crate) struct SerialAllocator {
    next: AtomicU64,
}

impl SerialAllocator {
    pub(crate) const fn new() -> Self {
        SerialAllocator {
            next: AtomicU64::new(1),
        }
    }

    /// Hand out the next serial.
    pub(crate) fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The serial the next call to [`next`] will return, without claiming it.
    ///
    /// Any record appended after this call receives a serial >= the returned
    /// value, which is what error marks snapshot at construction.
    ///
    /// [`next`]: SerialAllocator::next
    pub(crate) fn peek_next(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
