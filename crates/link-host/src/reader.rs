//! Serial Link Reader
//!
//! Drives one receive session: start command, read loop, reset command.

use crate::config::HostConfig;
use crate::error::HostError;
use packet_protocol::{Command, PacketDecoder, PayloadWidth, Record};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

/// Receives and decodes the packet stream from one transmitter
pub struct LinkReader<S> {
    stream: S,
    decoder: PacketDecoder,
    read_buf: Vec<u8>,
}

impl LinkReader<SerialStream> {
    /// Open the configured serial port (8 data bits, no parity, 1 stop bit)
    pub fn open(config: &HostConfig) -> Result<Self, HostError> {
        info!(
            "Opening {} at {} baud, {}-byte payload",
            config.port,
            config.baud_rate,
            config.width.bytes()
        );

        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()?;

        Ok(Self::new(port, config.width, config.read_buffer_size))
    }
}

impl<S> LinkReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-open byte stream
    pub fn new(stream: S, width: PayloadWidth, read_buffer_size: usize) -> Self {
        Self {
            stream,
            decoder: PacketDecoder::new(width),
            read_buf: vec![0; read_buffer_size.max(width.packet_len())],
        }
    }

    /// Tell the transmitter to start sending
    pub async fn start(&mut self) -> Result<(), HostError> {
        debug!("Sending start command");
        self.send_command(Command::Start).await
    }

    /// Tell the transmitter to stop and drop its queue
    ///
    /// Any partially received packet is discarded so the next session starts aligned.
    pub async fn stop(&mut self) -> Result<(), HostError> {
        debug!("Sending reset command");
        self.send_command(Command::Reset).await?;
        self.decoder.clear();
        Ok(())
    }

    /// Perform one read and return every packet it completed
    pub async fn read_records(&mut self) -> Result<Vec<Record>, HostError> {
        let n = self.stream.read(&mut self.read_buf).await?;
        if n == 0 {
            return Err(HostError::Closed);
        }
        Ok(self.decoder.feed(&self.read_buf[..n]))
    }

    /// Start the transmitter, forward decoded batches until shutdown, then reset it
    ///
    /// Returns the number of records forwarded.
    pub async fn run(
        mut self,
        sender: mpsc::Sender<Vec<Record>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64, HostError> {
        self.start().await?;
        let mut forwarded = 0u64;

        let result = loop {
            tokio::select! {
                _ = shutdown.changed() => break Ok(()),
                read = self.read_records() => match read {
                    Ok(records) if records.is_empty() => {}
                    Ok(records) => {
                        forwarded += records.len() as u64;
                        if sender.send(records).await.is_err() {
                            debug!("Record receiver dropped, stopping");
                            break Ok(());
                        }
                    }
                    Err(e) => break Err(e),
                },
            }
        };

        if let Err(e) = self.stop().await {
            warn!("Failed to send reset command: {}", e);
        }
        info!("Link reader stopped after {} records", forwarded);
        result.map(|()| forwarded)
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn send_command(&mut self, command: Command) -> Result<(), HostError> {
        self.stream.write_all(&[command.to_byte()]).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
