//! Packet Encoding and Decoding

use crate::error::ProtocolError;
use crate::record::{PayloadWidth, Record};

/// Largest packet on the wire: 4 data bytes plus the timestamp
pub const MAX_PACKET_LEN: usize = 5;

/// An encoded packet held in a fixed buffer, sliced to the width actually used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    bytes: [u8; MAX_PACKET_LEN],
    len: usize,
}

impl Packet {
    /// Encoded bytes in transmission order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Encode a record as `width` data bytes (MSB first) followed by the timestamp
pub fn encode(record: &Record, width: PayloadWidth) -> Packet {
    let mut bytes = [0u8; MAX_PACKET_LEN];
    let data_len = width.bytes();

    // Big-endian: take the low `data_len` bytes of the 4-byte representation
    let be = width.mask(record.value).to_be_bytes();
    bytes[..data_len].copy_from_slice(&be[be.len() - data_len..]);
    bytes[data_len] = record.timestamp;

    Packet {
        bytes,
        len: width.packet_len(),
    }
}

/// Decode exactly one packet previously produced by [`encode`]
pub fn decode(packet: &[u8], width: PayloadWidth) -> Result<Record, ProtocolError> {
    let expected = width.packet_len();
    if packet.len() != expected {
        return Err(ProtocolError::PacketLength {
            expected,
            actual: packet.len(),
        });
    }

    let data_len = width.bytes();
    let value = packet[..data_len]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);

    Ok(Record {
        value,
        timestamp: packet[data_len],
    })
}
