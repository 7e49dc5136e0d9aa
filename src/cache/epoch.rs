//! Epoch Counter
//!
//! Generation stamp shared by every entry of one cache instance. Advancing it
//! invalidates all entries at once.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter.
///
/// Starts at 0 and is advanced once per committed mutation. All accesses use
/// `SeqCst`, so no reader can observe the counter moving backwards.
///
/// The counter wraps after 2^64 advances. At a billion mutations per second
/// that takes roughly 584 years, so wraparound is not handled.
#[derive(Debug, Default)]
pub struct Epoch {
    current: AtomicU64,
}

impl Epoch {
    /// Creates a counter at epoch 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current epoch.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Advances the epoch by one and returns the new value.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}
