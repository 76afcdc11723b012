//! Transmit Gate and Command Polling

use crate::transport::Transport;
use packet_protocol::Command;
use ring_buffer::RingBuffer;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Owns the transmit-enable gate and applies inbound control bytes
///
/// Commands are polled inline at the start of every data-path call, so a
/// command arriving mid-operation takes effect at the next call boundary
/// (or the next packet, inside a buffer flush). The gate is shared by the
/// producer and consumer sides of a link, so it is an atomic flag.
#[derive(Debug, Default)]
pub struct CommandProcessor {
    transmit_enabled: AtomicBool,
}

impl CommandProcessor {
    /// Create a processor with transmission disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a start command has been seen since the last reset
    pub fn is_transmit_enabled(&self) -> bool {
        self.transmit_enabled.load(Ordering::SeqCst)
    }

    /// Consume at most one inbound byte and act on it
    ///
    /// Returns `true` if a byte was consumed, recognized or not.
    pub fn poll<T, R>(&self, transport: &mut T, buffer: &RingBuffer<R>) -> bool
    where
        T: Transport + ?Sized,
    {
        if !transport.has_incoming_byte() {
            return false;
        }

        let byte = transport.receive_byte();
        match Command::from_byte(byte) {
            Some(command) => self.apply(command, buffer),
            None => trace!("Ignoring unrecognized control byte {:#04x}", byte),
        }
        true
    }

    /// Apply a decoded command to the gate and buffer
    ///
    /// A reset clears the gate before rewinding the buffer, so a concurrent
    /// `store` either sees the gate closed or has its batch discarded.
    pub fn apply<R>(&self, command: Command, buffer: &RingBuffer<R>) {
        match command {
            Command::Start => {
                debug!("Start command received, transmission enabled");
                self.transmit_enabled.store(true, Ordering::SeqCst);
            }
            Command::Reset => {
                debug!(
                    "Reset command received, dropping {} queued records",
                    buffer.len()
                );
                self.transmit_enabled.store(false, Ordering::SeqCst);
                buffer.reset();
            }
        }
    }
}
