//! Link Monitor - prints records received from a UART link transmitter
//!
//! Usage: `link-monitor [config.toml]`, with `LINK_*` environment overrides.

use anyhow::Context;
use link_host::{init_logging, render, HostConfig, LinkReader};
use tokio::sync::{mpsc, watch};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== UART Link Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1);
    let config = HostConfig::load(path.as_deref()).context("Failed to load configuration")?;

    let reader = LinkReader::open(&config)
        .with_context(|| format!("Failed to open serial port {}", config.port))?;

    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(reader.run(tx, shutdown_rx));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, resetting transmitter");
                break;
            }
            batch = rx.recv() => match batch {
                Some(records) => {
                    for record in &records {
                        println!("{}", render(record, config.output)?);
                    }
                }
                None => break,
            },
        }
    }

    // The reader may already have exited on its own
    let _ = shutdown_tx.send(true);
    let total = handle.await.context("Reader task panicked")??;
    info!("Received {} records", total);

    Ok(())
}
