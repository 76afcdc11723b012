//! Host receiver configuration

use crate::error::HostError;
use crate::output::OutputFormat;
use packet_protocol::PayloadWidth;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `LINK_PORT=/dev/ttyACM0`
pub const ENV_PREFIX: &str = "LINK";

/// Receiver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub port: String,

    /// Baud rate; must match the transmitter
    pub baud_rate: u32,

    /// Payload width the transmitter was initialized with
    pub width: PayloadWidth,

    /// Bytes requested per read
    pub read_buffer_size: usize,

    /// Decoded batches buffered between reader and consumer
    pub channel_capacity: usize,

    /// How records are printed by the monitor
    pub output: OutputFormat,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 921_600,
            width: PayloadWidth::One,
            read_buffer_size: 4096,
            channel_capacity: 64,
            output: OutputFormat::Log,
        }
    }
}

impl HostConfig {
    /// Load defaults, then an optional config file, then `LINK_*` environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, HostError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.baud_rate, 921_600);
        assert_eq!(config.width, PayloadWidth::One);
        assert_eq!(config.read_buffer_size, 4096);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("link-host-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("monitor.toml");
        std::fs::write(
            &path,
            "port = \"/dev/ttyACM0\"\nbaud_rate = 115200\nwidth = 2\noutput = \"json\"\n",
        )
        .unwrap();

        let config = HostConfig::load(path.to_str()).unwrap();
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.width, PayloadWidth::Two);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.channel_capacity, 64);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_width_rejected() {
        let dir = std::env::temp_dir().join(format!("link-host-badwidth-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("monitor.toml");
        std::fs::write(&path, "width = 3\n").unwrap();

        assert!(matches!(
            HostConfig::load(path.to_str()),
            Err(HostError::Config(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
