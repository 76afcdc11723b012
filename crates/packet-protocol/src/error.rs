//! Packet Protocol Error Types

use thiserror::Error;

/// Errors raised while interpreting packet bytes or protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Payload width is not one of 1, 2 or 4 bytes
    #[error("Invalid payload width: {0} bytes (expected 1, 2 or 4)")]
    InvalidWidth(u8),

    /// Packet slice does not match the configured width
    #[error("Packet length mismatch: expected {expected} bytes, got {actual}")]
    PacketLength { expected: usize, actual: usize },
}
