//! Byte Transport Capability
//!
//! The pipeline only ever talks to the serial peripheral through this trait.
//! Peripheral clocking, baud rate and parity are configured by whoever
//! constructs the transport.

use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Ready-flag polls allowed per byte before giving up
pub const DEFAULT_READY_RETRIES: u32 = 5000;

/// Polled byte-level serial link
pub trait Transport {
    /// Enable the peripheral; called once by `UartLink::init`
    fn enable(&mut self);

    /// The transmit register can accept another byte
    fn is_ready_to_send(&mut self) -> bool;

    /// Hand one byte to the transmitter
    fn send_byte(&mut self, byte: u8);

    /// Every accepted byte has left the wire
    fn is_transmission_complete(&mut self) -> bool;

    /// A received byte is waiting
    fn has_incoming_byte(&mut self) -> bool;

    /// Take the waiting received byte
    fn receive_byte(&mut self) -> u8;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn enable(&mut self) {
        (**self).enable()
    }

    fn is_ready_to_send(&mut self) -> bool {
        (**self).is_ready_to_send()
    }

    fn send_byte(&mut self, byte: u8) {
        (**self).send_byte(byte)
    }

    fn is_transmission_complete(&mut self) -> bool {
        (**self).is_transmission_complete()
    }

    fn has_incoming_byte(&mut self) -> bool {
        (**self).has_incoming_byte()
    }

    fn receive_byte(&mut self) -> u8 {
        (**self).receive_byte()
    }
}

/// Transport shared by the producer and consumer halves of a link
///
/// `&SharedTransport<T>` is itself a [`Transport`] that locks once per call,
/// so a flush spinning on the ready or completion flag never keeps the other
/// half from polling commands for longer than a single register access.
#[derive(Debug, Default)]
pub struct SharedTransport<T> {
    inner: Mutex<T>,
}

impl<T> SharedTransport<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: Mutex::new(transport),
        }
    }

    /// Exclusive access for a multi-call sequence
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transport> Transport for &SharedTransport<T> {
    fn enable(&mut self) {
        self.lock().enable()
    }

    fn is_ready_to_send(&mut self) -> bool {
        self.lock().is_ready_to_send()
    }

    fn send_byte(&mut self, byte: u8) {
        self.lock().send_byte(byte)
    }

    fn is_transmission_complete(&mut self) -> bool {
        self.lock().is_transmission_complete()
    }

    fn has_incoming_byte(&mut self) -> bool {
        self.lock().has_incoming_byte()
    }

    fn receive_byte(&mut self) -> u8 {
        self.lock().receive_byte()
    }
}

/// How long to wait for the transmitter to drain after a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionWait {
    /// Block until the transport reports completion, however long it takes
    #[default]
    Unbounded,
    /// Give up after this many polls
    Polls(u32),
}

/// Blocking/timeout policy for sending one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxPolicy {
    /// Ready-flag polls per byte before reporting `SendTimeout`
    pub ready_retries: u32,
    /// Wait applied after the last byte of each packet
    pub completion: CompletionWait,
}

impl Default for TxPolicy {
    fn default() -> Self {
        Self {
            ready_retries: DEFAULT_READY_RETRIES,
            completion: CompletionWait::Unbounded,
        }
    }
}

impl TxPolicy {
    /// Policy with both waits bounded
    pub fn bounded(ready_retries: u32, completion_polls: u32) -> Self {
        Self {
            ready_retries,
            completion: CompletionWait::Polls(completion_polls),
        }
    }

    /// Send every byte of a packet, then wait for the link to drain
    ///
    /// Bytes already handed to the transport are not taken back on timeout,
    /// so a partial packet may be on the wire.
    pub fn send_packet<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        bytes: &[u8],
    ) -> Result<(), LinkError> {
        for (sent, &byte) in bytes.iter().enumerate() {
            if !self.wait_ready(transport) {
                warn!(
                    "Transport not ready after {} polls, {} of {} bytes sent",
                    self.ready_retries,
                    sent,
                    bytes.len()
                );
                return Err(LinkError::SendTimeout {
                    bytes_sent: sent,
                    packet_len: bytes.len(),
                });
            }
            transport.send_byte(byte);
        }

        self.await_completion(transport)
    }

    fn wait_ready<T: Transport + ?Sized>(&self, transport: &mut T) -> bool {
        let mut remaining = self.ready_retries;
        loop {
            if transport.is_ready_to_send() {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            std::hint::spin_loop();
        }
    }

    fn await_completion<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<(), LinkError> {
        match self.completion {
            CompletionWait::Unbounded => {
                while !transport.is_transmission_complete() {
                    std::hint::spin_loop();
                }
                Ok(())
            }
            CompletionWait::Polls(limit) => {
                for _ in 0..=limit {
                    if transport.is_transmission_complete() {
                        return Ok(());
                    }
                    std::hint::spin_loop();
                }
                warn!("Transmission not complete after {} polls", limit);
                Err(LinkError::CompletionTimeout(limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_send_packet_writes_all_bytes() {
        let mut transport = MockTransport::new();
        TxPolicy::default()
            .send_packet(&mut transport, &[0x12, 0x34, 0x7A])
            .unwrap();
        assert_eq!(transport.sent(), &[0x12, 0x34, 0x7A]);
    }

    #[test]
    fn test_send_timeout_keeps_partial_packet() {
        let mut transport = MockTransport::new().stall_after(2);
        let err = TxPolicy::bounded(10, 10)
            .send_packet(&mut transport, &[0xDE, 0xAD, 0xBE, 0xEF, 0x01])
            .unwrap_err();

        assert_eq!(err, LinkError::SendTimeout { bytes_sent: 2, packet_len: 5 });
        assert_eq!(transport.sent(), &[0xDE, 0xAD]);
    }

    #[test]
    fn test_ready_retry_budget_is_respected() {
        let mut transport = MockTransport::new().stall_after(0);
        let policy = TxPolicy { ready_retries: 25, ..Default::default() };
        assert!(policy.send_packet(&mut transport, &[0x01]).is_err());
        // One initial poll plus the retry budget
        assert_eq!(transport.ready_polls(), 26);
    }

    #[test]
    fn test_unbounded_completion_waits_for_slow_link() {
        let mut transport = MockTransport::new().completion_delay(1000);
        TxPolicy::default()
            .send_packet(&mut transport, &[0x01, 0x02])
            .unwrap();
        assert!(transport.completion_polls() > 1000);
    }

    #[test]
    fn test_bounded_completion_times_out() {
        let mut transport = MockTransport::new().never_complete();
        let err = TxPolicy::bounded(10, 50)
            .send_packet(&mut transport, &[0x01, 0x02])
            .unwrap_err();
        assert_eq!(err, LinkError::CompletionTimeout(50));
        assert_eq!(transport.sent(), &[0x01, 0x02]);
    }

    #[test]
    fn test_shared_transport_sends_through_lock() {
        let shared = SharedTransport::new(MockTransport::new());
        TxPolicy::default()
            .send_packet(&mut &shared, &[0x05, 0x7A])
            .unwrap();
        assert_eq!(shared.lock().sent(), &[0x05, 0x7A]);
    }

    #[test]
    fn test_policy_config_roundtrip() {
        let json = r#"{"ready_retries": 100, "completion": {"polls": 2000}}"#;
        let policy: TxPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy, TxPolicy::bounded(100, 2000));

        let policy: TxPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, TxPolicy::default());
    }
}
