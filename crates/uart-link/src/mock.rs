//! Scripted in-memory transport
//!
//! Records every byte sent and replays queued inbound bytes, with knobs to
//! stall the transmitter or delay completion. Used by the tests and for
//! exercising the pipeline without hardware.

use crate::transport::Transport;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory transport for tests and simulations
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    sent: Vec<u8>,
    inbound: VecDeque<u8>,
    /// Inbound bytes that arrive once this many bytes have been sent
    scheduled: Vec<(usize, u8)>,
    enabled: bool,
    /// Ready flag drops permanently once this many bytes have been sent
    stall_after: Option<usize>,
    completion_delay: u32,
    never_complete: bool,
    /// Completion is withheld until this flag is raised
    completion_gate: Option<Arc<AtomicBool>>,
    polls_since_send: u32,
    ready_polls: usize,
    completion_polls: usize,
}

impl MockTransport {
    /// Create an idle transport that accepts every byte immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as already received
    pub fn with_inbound(mut self, bytes: &[u8]) -> Self {
        self.inbound.extend(bytes);
        self
    }

    /// Stop accepting bytes after `bytes` have been sent
    pub fn stall_after(mut self, bytes: usize) -> Self {
        self.stall_after = Some(bytes);
        self
    }

    /// Report completion only after this many polls following the last byte
    pub fn completion_delay(mut self, polls: u32) -> Self {
        self.completion_delay = polls;
        self
    }

    /// Never report transmission complete
    pub fn never_complete(mut self) -> Self {
        self.never_complete = true;
        self
    }

    /// Withhold completion until `release` is set, e.g. from another thread
    pub fn hold_completion(mut self, release: Arc<AtomicBool>) -> Self {
        self.completion_gate = Some(release);
        self
    }

    /// Make a byte available immediately
    pub fn push_inbound(&mut self, byte: u8) {
        self.inbound.push_back(byte);
    }

    /// Make a byte available once `after_sent` bytes have gone out
    pub fn inject_after(&mut self, after_sent: usize, byte: u8) {
        self.scheduled.push((after_sent, byte));
    }

    /// Let a stalled transmitter accept bytes again
    pub fn unstall(&mut self) {
        self.stall_after = None;
    }

    /// Every byte sent so far
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Drain the sent log
    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sent)
    }

    /// Inbound bytes not yet consumed
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len() + self.scheduled.len()
    }

    /// Whether `enable` has been called
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Total ready-flag polls
    pub fn ready_polls(&self) -> usize {
        self.ready_polls
    }

    /// Total completion-flag polls
    pub fn completion_polls(&self) -> usize {
        self.completion_polls
    }

    fn release_scheduled(&mut self) {
        let sent = self.sent.len();
        let (due, later): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|&(after, _)| after <= sent);
        self.scheduled = later;
        self.inbound.extend(due.into_iter().map(|(_, byte)| byte));
    }
}

impl Transport for MockTransport {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn is_ready_to_send(&mut self) -> bool {
        self.ready_polls += 1;
        match self.stall_after {
            Some(limit) => self.sent.len() < limit,
            None => true,
        }
    }

    fn send_byte(&mut self, byte: u8) {
        self.sent.push(byte);
        self.polls_since_send = 0;
    }

    fn is_transmission_complete(&mut self) -> bool {
        self.completion_polls += 1;
        if self.never_complete {
            return false;
        }
        if let Some(release) = &self.completion_gate {
            if !release.load(Ordering::Acquire) {
                return false;
            }
        }
        self.polls_since_send = self.polls_since_send.saturating_add(1);
        self.polls_since_send > self.completion_delay
    }

    fn has_incoming_byte(&mut self) -> bool {
        self.release_scheduled();
        !self.inbound.is_empty()
    }

    fn receive_byte(&mut self) -> u8 {
        self.inbound.pop_front().unwrap_or(0)
    }
}
