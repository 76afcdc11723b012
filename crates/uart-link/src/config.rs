//! Link configuration

use crate::transport::TxPolicy;
use packet_protocol::PayloadWidth;
use ring_buffer::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Settings fixed for the lifetime of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Ring buffer slots (one is always kept free)
    pub capacity: usize,

    /// Payload bytes per packet
    pub width: PayloadWidth,

    /// Per-byte and per-packet wait policy
    pub tx: TxPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            width: PayloadWidth::default(),
            tx: TxPolicy::default(),
        }
    }
}

impl LinkConfig {
    /// Default settings with the given payload width
    pub fn with_width(width: PayloadWidth) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Override the number of buffer slots
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the transmit policy
    pub fn tx_policy(mut self, tx: TxPolicy) -> Self {
        self.tx = tx;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.capacity, 128);
        assert_eq!(config.width, PayloadWidth::One);
        assert_eq!(config.tx.ready_retries, 5000);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: LinkConfig = serde_json::from_str(r#"{"width": 4}"#).unwrap();
        assert_eq!(config.width, PayloadWidth::Four);
        assert_eq!(config.capacity, 128);
    }
}
