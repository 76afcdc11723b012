//! Streaming Packet Decoder
//!
//! Reassembles fixed-width packets from arbitrarily chunked serial reads.

use crate::codec::decode;
use crate::record::{PayloadWidth, Record};

/// Incremental decoder for the unframed packet stream
#[derive(Debug, Clone)]
pub struct PacketDecoder {
    width: PayloadWidth,
    /// Bytes of an incomplete packet carried over from the previous chunk
    pending: Vec<u8>,
}

impl PacketDecoder {
    /// Create a decoder for the given payload width
    pub fn new(width: PayloadWidth) -> Self {
        Self {
            width,
            pending: Vec::with_capacity(width.packet_len()),
        }
    }

    /// Payload width this decoder was created for
    pub fn width(&self) -> PayloadWidth {
        self.width
    }

    /// Feed a chunk of received bytes and return every completed record
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Record> {
        let packet_len = self.width.packet_len();
        self.pending.extend_from_slice(chunk);

        let complete = self.pending.len() / packet_len * packet_len;
        let records = self.pending[..complete]
            .chunks_exact(packet_len)
            .filter_map(|packet| decode(packet, self.width).ok())
            .collect();

        self.pending.drain(..complete);
        records
    }

    /// Bytes buffered towards the next packet
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Discard any partially received packet
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
