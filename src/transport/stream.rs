//! Asynchronous stream (UART) transport implementation.
//!
//! This module provides a half-duplex byte stream over a tty-style
//! device in raw mode with flow control disabled. Reads follow a
//! completion policy of minimum byte count or inactivity window,
//! whichever triggers first.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{
    DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits,
};

use crate::error::{Error, Result};
use crate::transport::{HalfDuplex, Transport};

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default inactivity window before a read returns.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Default minimum bytes before a read unblocks.
pub const DEFAULT_MIN_READ: usize = 1;

/// Configuration for the stream transport.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Device path (e.g., "/dev/ttyS1").
    pub path: String,
    /// Baud rate, applied to both directions.
    pub baud_rate: u32,
    /// Parity bit setting.
    pub parity: Parity,
    /// Stop bit count.
    pub stop_bits: StopBits,
    /// Data bit count.
    pub data_bits: DataBits,
    /// Inactivity window before a read call returns.
    pub read_timeout: Duration,
    /// Minimum bytes before a read unblocks.
    pub min_read: usize,
}

impl StreamConfig {
    /// Creates a new stream configuration with default settings.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: DataBits::Eight,
            read_timeout: DEFAULT_READ_TIMEOUT,
            min_read: DEFAULT_MIN_READ,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the parity.
    #[must_use]
    pub const fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Sets the stop bit count.
    #[must_use]
    pub const fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Sets the data bit count.
    #[must_use]
    pub const fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Sets the read inactivity window.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the minimum bytes before a read unblocks.
    #[must_use]
    pub const fn min_read(mut self, min_read: usize) -> Self {
        self.min_read = min_read;
        self
    }
}

/// Stream transport for co-processor communication.
///
/// The session exclusively owns the port handle; dropping the transport
/// releases it even if [`Transport::close`] was never called.
pub struct StreamTransport {
    config: StreamConfig,
    stream: Option<SerialStream>,
}

impl StreamTransport {
    /// Creates a new stream transport with the given configuration.
    #[must_use]
    pub const fn new(config: StreamConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new stream transport for the given device path with
    /// default settings.
    #[must_use]
    pub fn with_path(path: impl Into<String>) -> Self {
        Self::new(StreamConfig::new(path))
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Applies line settings to the open device.
    ///
    /// Baud is set for both directions, the line format to the
    /// configured parity/stop/data bits, and software flow control is
    /// disabled for a raw byte stream.
    pub fn configure(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;

        stream
            .set_baud_rate(self.config.baud_rate)
            .map_err(|e| Error::Config {
                param: "baud rate",
                source: e.into(),
            })?;
        stream
            .set_parity(self.config.parity)
            .map_err(|e| Error::Config {
                param: "parity",
                source: e.into(),
            })?;
        stream
            .set_stop_bits(self.config.stop_bits)
            .map_err(|e| Error::Config {
                param: "stop bits",
                source: e.into(),
            })?;
        stream
            .set_data_bits(self.config.data_bits)
            .map_err(|e| Error::Config {
                param: "data bits",
                source: e.into(),
            })?;
        stream
            .set_flow_control(FlowControl::None)
            .map_err(|e| Error::Config {
                param: "flow control",
                source: e.into(),
            })?;

        Ok(())
    }
}

impl Transport for StreamTransport {
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!("opening stream device: {}", self.config.path);

            let stream = tokio_serial::new(&self.config.path, self.config.baud_rate)
                .open_native_async()
                .map_err(|e| Error::Open {
                    path: self.config.path.clone(),
                    source: e.into(),
                })?;
            self.stream = Some(stream);

            if let Err(e) = self.configure() {
                self.stream = None;
                return Err(e);
            }

            tracing::info!("stream device ready");
            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            match self.stream.take() {
                Some(stream) => {
                    tracing::info!("closing stream device");
                    drop(stream);
                    Ok(())
                }
                None => Err(Error::NotOpen),
            }
        })
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl HalfDuplex for StreamTransport {
    fn write(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;

            let written = stream.write(&data).await.map_err(Error::Io)?;
            stream.flush().await.map_err(Error::Io)?;

            tracing::trace!("wrote {} of {} bytes", written, data.len());
            Ok(written)
        })
    }

    fn read(
        &mut self,
        max_len: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            let min_read = self.config.min_read.min(max_len);
            let window = self.config.read_timeout;
            let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;

            let mut buf = vec![0u8; max_len];
            let mut filled = 0;

            // Completion policy: return once `min_read` bytes have
            // arrived, or once an inactivity window passes, whichever
            // comes first.
            while filled < max_len {
                match tokio::time::timeout(window, stream.read(&mut buf[filled..])).await {
                    Err(_) => {
                        tracing::debug!("read window expired with {filled} bytes");
                        break;
                    }
                    Ok(Ok(0)) => {
                        return Err(Error::Io(io::Error::new(
                            io::ErrorKind::ConnectionReset,
                            "stream closed",
                        )));
                    }
                    Ok(Ok(n)) => {
                        filled += n;
                        if filled >= min_read {
                            break;
                        }
                    }
                    Ok(Err(e)) => return Err(Error::Io(e)),
                }
            }

            tracing::trace!("read {filled} bytes");
            buf.truncate(filled);
            Ok(Bytes::from(buf))
        })
    }
}
