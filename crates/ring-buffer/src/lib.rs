//! Fixed-Capacity Ring Buffer
//!
//! Provides a single-producer/single-consumer circular queue with
//! storage allocated once up front. One slot is always left unused so a
//! full buffer can be told apart from an empty one. [`RingBuffer::split`]
//! hands out one [`Producer`] and one [`Consumer`] that can live on
//! different threads.

mod buffer;

pub use buffer::{Consumer, Peeked, Producer, RingBuffer, DEFAULT_CAPACITY};

use thiserror::Error;

/// Errors raised when constructing a ring buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// At least two slots are needed to hold one item
    #[error("Invalid ring buffer capacity {0}: must be at least 2")]
    InvalidCapacity(usize),
}

/// Reasons a batch push was refused; nothing was written in either case
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// Not enough free slots for the whole batch
    #[error("Ring buffer full: {requested} items requested, {free} slots free")]
    Full { requested: usize, free: usize },

    /// The buffer was reset after the caller read its generation
    #[error("Ring buffer was reset")]
    Reset,
}
