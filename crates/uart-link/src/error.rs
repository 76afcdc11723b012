//! Link Error Types

use ring_buffer::RingBufferError;
use thiserror::Error;

/// Errors returned by the transmit pipeline
///
/// Every failure is reported to the immediate caller; the link never retries
/// beyond the bounded per-byte wait inside a flush.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// A data-path call was made before `init`
    #[error("UART link is not initialized")]
    NotInitialized,

    /// `init` was called on a link that is already running
    #[error("UART link is already initialized")]
    AlreadyInitialized,

    /// Buffer capacity rejected at initialization
    #[error("Invalid link configuration: {0}")]
    InvalidConfig(#[from] RingBufferError),

    /// No start command received yet, or a reset disabled transmission
    #[error("Transmission is disabled")]
    TransmissionDisabled,

    /// Not enough free slots for the whole batch; nothing was stored
    #[error("Buffer full: {requested} values requested, {free} slots free")]
    BufferFull { requested: usize, free: usize },

    /// Nothing queued to flush
    #[error("Buffer is empty")]
    BufferEmpty,

    /// Transport never became ready for the next byte
    ///
    /// `bytes_sent` bytes of the packet already reached the link.
    #[error("Send timeout after {bytes_sent} of {packet_len} packet bytes")]
    SendTimeout { bytes_sent: usize, packet_len: usize },

    /// Bounded wait for transmission complete expired
    #[error("Timeout waiting for transmission complete after {0} polls")]
    CompletionTimeout(u32),
}
