//! Payload Width and Timestamped Record

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Number of data bytes carried by every packet of a link
///
/// Chosen once when the link is set up; records are never mixed across widths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum PayloadWidth {
    /// 8-bit payload
    #[default]
    One = 1,
    /// 16-bit payload
    Two = 2,
    /// 32-bit payload
    Four = 4,
}

impl PayloadWidth {
    /// Resolve a width from its byte count
    pub fn from_bytes(bytes: u8) -> Result<Self, ProtocolError> {
        match bytes {
            1 => Ok(PayloadWidth::One),
            2 => Ok(PayloadWidth::Two),
            4 => Ok(PayloadWidth::Four),
            other => Err(ProtocolError::InvalidWidth(other)),
        }
    }

    /// Data bytes per packet
    pub fn bytes(&self) -> usize {
        *self as usize
    }

    /// Total packet length including the timestamp byte
    pub fn packet_len(&self) -> usize {
        self.bytes() + 1
    }

    /// Keep only the low `width` bytes of a value
    pub fn mask(&self, value: u32) -> u32 {
        match self {
            PayloadWidth::One => value & 0xFF,
            PayloadWidth::Two => value & 0xFFFF,
            PayloadWidth::Four => value,
        }
    }
}

impl TryFrom<u8> for PayloadWidth {
    type Error = ProtocolError;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<PayloadWidth> for u8 {
    fn from(width: PayloadWidth) -> Self {
        width as u8
    }
}

/// One buffered sample: a value plus the low byte of the clock when it was stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Sample value; only the low `width` bytes are meaningful
    pub value: u32,
    /// 8-bit timestamp snapshot
    pub timestamp: u8,
}

impl Record {
    /// Create a record from a raw value, masking it to the given width
    pub fn new(value: u32, timestamp: u8, width: PayloadWidth) -> Self {
        Self {
            value: width.mask(value),
            timestamp,
        }
    }
}
