//! UART Link Packet Protocol
//!
//! Wire format shared by the transmitting device and the host receiver.
//! Each packet carries `width` data bytes (MSB first) followed by one
//! timestamp byte. There is no delimiter or length prefix between packets,
//! so both ends must agree on the payload width out-of-band.

mod codec;
mod command;
mod decoder;
mod error;
mod record;

pub use codec::{decode, encode, Packet, MAX_PACKET_LEN};
pub use command::Command;
pub use decoder::PacketDecoder;
pub use error::ProtocolError;
pub use record::{PayloadWidth, Record};
