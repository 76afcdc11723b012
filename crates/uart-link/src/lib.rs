//! UART Link Transmitter
//!
//! Buffers timestamped samples and drains them as fixed-width packets over
//! a byte-oriented serial transport. Transmission is gated by single-byte
//! commands read back from the same link: `S` enables sending, `R` disables
//! it and discards everything queued.
//!
//! The transport is an abstract capability ([`Transport`]) so the same
//! pipeline drives a memory-mapped USART, a host serial port, or the
//! [`MockTransport`] used in tests.

mod clock;
mod command;
mod config;
mod error;
mod link;
pub mod mock;
mod transport;

pub use clock::{TickCounter, TimestampSource};
pub use command::CommandProcessor;
pub use config::LinkConfig;
pub use error::LinkError;
pub use link::{LinkConsumer, LinkProducer, UartLink};
pub use mock::MockTransport;
pub use transport::{
    CompletionWait, SharedTransport, Transport, TxPolicy, DEFAULT_READY_RETRIES,
};

pub use packet_protocol::{Command, PayloadWidth, Record};
