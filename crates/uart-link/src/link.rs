//! Buffered Transmit Pipeline
//!
//! `store` is the producer side and `flush_one` / `flush_buffer` the consumer
//! side. [`UartLink::split`] hands them out as a [`LinkProducer`] and a
//! [`LinkConsumer`] that can run on different threads: the producer only
//! advances the buffer head and the consumer only the tail, and neither holds
//! a lock while a packet is on the wire. A reset command, picked up by
//! whichever side polls first, closes the gate and rewinds both indices
//! inside the buffer's critical section.

use crate::clock::TimestampSource;
use crate::command::CommandProcessor;
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::transport::{SharedTransport, Transport, TxPolicy};
use packet_protocol::{encode, PayloadWidth, Record};
use ring_buffer::{Consumer, Producer, PushError, RingBuffer};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State both halves of a link see
#[derive(Debug)]
struct Shared<T> {
    transport: SharedTransport<T>,
    commands: CommandProcessor,
    width: PayloadWidth,
    tx: TxPolicy,
}

impl<T: Transport> Shared<T> {
    /// Poll one control byte, then report whether the gate is open
    fn check_gate(&self, records: &RingBuffer<Record>) -> Result<(), LinkError> {
        self.commands.poll(&mut *self.transport.lock(), records);
        if self.commands.is_transmit_enabled() {
            Ok(())
        } else {
            Err(LinkError::TransmissionDisabled)
        }
    }
}

/// Sampling half of a link: stamps and queues values
#[derive(Debug)]
pub struct LinkProducer<T, C> {
    shared: Arc<Shared<T>>,
    records: Producer<Record>,
    clock: C,
}

/// Draining half of a link: sends queued records as packets
#[derive(Debug)]
pub struct LinkConsumer<T> {
    shared: Arc<Shared<T>>,
    records: Consumer<Record>,
}

/// Timestamped sample buffer drained as packets over a [`Transport`]
pub struct UartLink<T, C> {
    config: LinkConfig,
    halves: Option<(LinkProducer<T, C>, LinkConsumer<T>)>,
}

impl<T, C> UartLink<T, C>
where
    T: Transport,
    C: TimestampSource,
{
    /// Create an uninitialized link; data-path calls fail until `init`
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            halves: None,
        }
    }

    /// Allocate the buffer, enable the transport and fix the clock source
    pub fn init(&mut self, mut transport: T, clock: C) -> Result<(), LinkError> {
        if self.halves.is_some() {
            return Err(LinkError::AlreadyInitialized);
        }

        let (producer, consumer) = RingBuffer::new(self.config.capacity)?.split();
        transport.enable();

        info!(
            "UART link initialized: {}-byte payload, {} buffer slots",
            self.config.width.bytes(),
            self.config.capacity
        );

        let shared = Arc::new(Shared {
            transport: SharedTransport::new(transport),
            commands: CommandProcessor::new(),
            width: self.config.width,
            tx: self.config.tx,
        });
        self.halves = Some((
            LinkProducer {
                shared: Arc::clone(&shared),
                records: producer,
                clock,
            },
            LinkConsumer {
                shared,
                records: consumer,
            },
        ));
        Ok(())
    }

    /// Hand out the producer and consumer halves of an initialized link
    pub fn split(self) -> Result<(LinkProducer<T, C>, LinkConsumer<T>), LinkError> {
        self.halves.ok_or(LinkError::NotInitialized)
    }

    /// Queue a batch of values, stamping each with its own timestamp
    ///
    /// Either every value is queued or none are.
    pub fn store(&mut self, values: &[u32]) -> Result<(), LinkError> {
        let (producer, _) = self.halves.as_mut().ok_or(LinkError::NotInitialized)?;
        producer.store(values)
    }

    /// Transmit the oldest queued record
    pub fn flush_one(&mut self) -> Result<(), LinkError> {
        let (_, consumer) = self.halves.as_mut().ok_or(LinkError::NotInitialized)?;
        consumer.flush_one()
    }

    /// Transmit queued records until the buffer is empty
    ///
    /// Returns the number of packets sent.
    pub fn flush_buffer(&mut self) -> Result<usize, LinkError> {
        let (_, consumer) = self.halves.as_mut().ok_or(LinkError::NotInitialized)?;
        consumer.flush_buffer()
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.halves.is_some()
    }

    /// Whether the gate currently allows storing and sending
    pub fn is_transmit_enabled(&self) -> bool {
        self.halves
            .as_ref()
            .is_some_and(|(_, c)| c.is_transmit_enabled())
    }

    /// Records queued for transmission
    pub fn len(&self) -> usize {
        self.halves.as_ref().map_or(0, |(_, c)| c.len())
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots available to the next `store`
    pub fn free_slots(&self) -> usize {
        self.halves.as_ref().map_or(0, |(p, _)| p.free_slots())
    }

    /// Queued records, oldest first
    pub fn queued(&self) -> Vec<Record> {
        self.halves
            .as_ref()
            .map(|(_, c)| c.queued())
            .unwrap_or_default()
    }

    pub fn width(&self) -> PayloadWidth {
        self.config.width
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the transport, if initialized
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.halves.as_ref().map(|(_, c)| c.with_transport(f))
    }
}

impl<T, C> LinkProducer<T, C>
where
    T: Transport,
    C: TimestampSource,
{
    /// Queue a batch of values, stamping each with its own timestamp
    ///
    /// Either every value is queued or none are. A reset that lands between
    /// the gate check and the write discards the batch.
    pub fn store(&mut self, values: &[u32]) -> Result<(), LinkError> {
        // Generation is read before the gate so a reset after the check is caught
        let generation = self.records.generation();
        self.shared.check_gate(&self.records)?;

        let width = self.shared.width;
        let clock = &self.clock;
        let batch = values
            .iter()
            .map(|&value| Record::new(value, clock.snapshot(), width));

        match self.records.push_all_in(generation, batch) {
            Ok(()) => Ok(()),
            Err(PushError::Full { requested, free }) => {
                warn!(
                    "Dropping batch of {} values, only {} slots free",
                    requested, free
                );
                Err(LinkError::BufferFull { requested, free })
            }
            Err(PushError::Reset) => {
                debug!("Reset during store, batch of {} values dropped", values.len());
                Err(LinkError::TransmissionDisabled)
            }
        }
    }

    /// Slots available to the next `store`
    pub fn free_slots(&self) -> usize {
        self.records.free_slots()
    }

    /// Records queued for transmission
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_transmit_enabled(&self) -> bool {
        self.shared.commands.is_transmit_enabled()
    }

    /// Queued records, oldest first
    pub fn queued(&self) -> Vec<Record> {
        self.records.snapshot()
    }

    /// Run `f` with exclusive access to the transport
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.shared.transport.lock())
    }
}

impl<T: Transport> LinkConsumer<T> {
    /// Transmit the oldest queued record
    pub fn flush_one(&mut self) -> Result<(), LinkError> {
        self.shared.check_gate(&self.records)?;
        self.send_next()
    }

    /// Transmit queued records until the buffer is empty
    ///
    /// Commands are re-polled before every packet, so a reset arriving
    /// mid-flush stops the loop with the remaining records discarded.
    /// Returns the number of packets sent.
    pub fn flush_buffer(&mut self) -> Result<usize, LinkError> {
        self.shared.check_gate(&self.records)?;
        if self.records.is_empty() {
            return Err(LinkError::BufferEmpty);
        }

        let mut sent = 0;
        while !self.records.is_empty() {
            if sent > 0 {
                if let Err(e) = self.shared.check_gate(&self.records) {
                    debug!("Flush aborted after {} packets", sent);
                    return Err(e);
                }
            }
            self.send_next()?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Records queued for transmission
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_transmit_enabled(&self) -> bool {
        self.shared.commands.is_transmit_enabled()
    }

    /// Queued records, oldest first
    pub fn queued(&self) -> Vec<Record> {
        self.records.snapshot()
    }

    /// Run `f` with exclusive access to the transport
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.shared.transport.lock())
    }

    /// Encode and send the record at the tail, dequeuing it once sent
    fn send_next(&mut self) -> Result<(), LinkError> {
        let peeked = self.records.peek().ok_or(LinkError::BufferEmpty)?;
        let packet = encode(&peeked.item, self.shared.width);

        self.shared
            .tx
            .send_packet(&mut &self.shared.transport, packet.as_bytes())?;
        if !self.records.commit(peeked) {
            debug!("Buffer reset while sending, record already discarded");
        }
        Ok(())
    }
}
