//! Host Receiver Error Types

use thiserror::Error;

/// Errors that can occur while receiving from the link
#[derive(Debug, Error)]
pub enum HostError {
    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Read or write on the open port failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file or environment could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Record could not be rendered for output
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// The port reported end of stream
    #[error("Serial link closed")]
    Closed,
}
