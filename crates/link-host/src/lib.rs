//! UART Link Host Receiver
//!
//! Opens the serial port a transmitter is attached to, enables it with the
//! start command, reassembles the unframed packet stream, and resets the
//! transmitter again when reading stops.

mod config;
mod error;
mod output;
mod reader;

pub use config::HostConfig;
pub use error::HostError;
pub use output::{render, OutputFormat};
pub use reader::LinkReader;

pub use packet_protocol::{PayloadWidth, Record};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global log subscriber
///
/// Logs go to stderr so record output on stdout stays machine-readable.
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
