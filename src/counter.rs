use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Count of push messages received since the last sample tick.
///
/// Clones share the same count. The counter lives as long as the dashboard,
/// not a connection, so a dropped link cannot carry a stale count forward.
#[derive(Debug, Clone, Default)]
pub struct EventCounter {
    count: Arc<AtomicU64>,
}

impl EventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the count accumulated since the previous call and resets it to 0.
    pub fn read_and_reset(&self) -> u64 {
        self.count.swap(0, Ordering::AcqRel)
    }

    pub fn peek(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}
