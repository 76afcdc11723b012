//! Record rendering for the monitor

use crate::error::HostError;
use packet_protocol::Record;
use serde::{Deserialize, Serialize};

/// Output format for received records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable `t=.. value=..` lines
    #[default]
    Log,
    /// One JSON object per line
    Json,
}

/// Render one record as a single output line
pub fn render(record: &Record, format: OutputFormat) -> Result<String, HostError> {
    match format {
        OutputFormat::Log => Ok(format!(
            "t={:3} value={} (0x{:08X})",
            record.timestamp, record.value, record.value
        )),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
    }
}
