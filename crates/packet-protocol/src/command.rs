//! Inbound Control Commands
//!
//! Single bytes sent by the receiver on the same link as the packet stream.

use serde::{Deserialize, Serialize};

/// Control command understood by the transmitting side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    /// Enable transmission ('S')
    Start = b'S',
    /// Disable transmission and discard everything queued ('R')
    Reset = b'R',
}

impl Command {
    /// Wire byte for this command
    pub fn to_byte(&self) -> u8 {
        *self as u8
    }

    /// Parse a received byte; anything unrecognized is `None`
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'S' => Some(Command::Start),
            b'R' => Some(Command::Reset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::Start.to_byte(), 0x53);
        assert_eq!(Command::Reset.to_byte(), 0x52);
        assert_eq!(Command::from_byte(0x53), Some(Command::Start));
        assert_eq!(Command::from_byte(0x52), Some(Command::Reset));
    }

    #[test]
    fn test_unknown_bytes_are_ignored() {
        for byte in [b's', b'r', b'X', 0x00, 0xFF] {
            assert_eq!(Command::from_byte(byte), None);
        }
    }
}
