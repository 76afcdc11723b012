//! Timestamp Sources

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Supplies the current time when a record is stored
///
/// Only the low byte of the returned value is kept.
pub trait TimestampSource {
    /// Current raw time value
    fn now(&self) -> u32;

    /// Low byte of the current time, as stamped on records
    fn snapshot(&self) -> u8 {
        (self.now() & 0xFF) as u8
    }
}

impl<F> TimestampSource for F
where
    F: Fn() -> u32,
{
    fn now(&self) -> u32 {
        self()
    }
}

/// Shared counter advanced by a periodic timer
///
/// Clones share the same counter, so a timer task can `tick` while the link
/// reads it.
#[derive(Debug, Clone, Default)]
pub struct TickCounter(Arc<AtomicU32>);

impl TickCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick, wrapping on overflow
    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Overwrite the current value
    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Relaxed);
    }

    /// Read the current value
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl TimestampSource for TickCounter {
    fn now(&self) -> u32 {
        self.get()
    }
}
