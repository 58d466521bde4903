//! Clocked-bus (SPI) transport implementation.
//!
//! This module talks to a spidev-style device. Every transaction is full
//! duplex at the configured mode, word size and clock speed.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tokio::task;

use crate::error::{Error, Result};
use crate::transport::{FullDuplex, Transport};

/// Default clock mode (polarity/phase selector 0-3).
pub const DEFAULT_MODE: u8 = 0;

/// Default word size in bits.
pub const DEFAULT_BITS_PER_WORD: u8 = 8;

/// Default maximum clock speed in Hz.
pub const DEFAULT_SPEED_HZ: u32 = 500_000;

/// Default settle delay between the request and collect transactions.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(6);

/// Configuration for the clocked-bus transport.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Device path (e.g., "/dev/spidev1.0").
    pub path: String,
    /// Clock polarity/phase selector (0-3).
    pub mode: u8,
    /// Bits per word.
    pub bits_per_word: u8,
    /// Maximum clock speed in Hz.
    pub speed_hz: u32,
    /// Wait between the request and collect transactions, giving the
    /// peripheral time to compute the reply.
    pub settle_delay: Duration,
}

impl BusConfig {
    /// Creates a new bus configuration with default settings.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: DEFAULT_MODE,
            bits_per_word: DEFAULT_BITS_PER_WORD,
            speed_hz: DEFAULT_SPEED_HZ,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Sets the clock mode.
    #[must_use]
    pub const fn mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the word size in bits.
    #[must_use]
    pub const fn bits_per_word(mut self, bits: u8) -> Self {
        self.bits_per_word = bits;
        self
    }

    /// Sets the maximum clock speed.
    #[must_use]
    pub const fn speed_hz(mut self, speed: u32) -> Self {
        self.speed_hz = speed;
        self
    }

    /// Sets the settle delay.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// Clocked-bus transport for co-processor communication.
///
/// The session exclusively owns the device handle; dropping the transport
/// releases it even if [`Transport::close`] was never called.
pub struct BusTransport {
    config: BusConfig,
    dev: Option<Spidev>,
}

impl BusTransport {
    /// Creates a new bus transport with the given configuration.
    #[must_use]
    pub const fn new(config: BusConfig) -> Self {
        Self { config, dev: None }
    }

    /// Creates a new bus transport for the given device path with
    /// default settings.
    #[must_use]
    pub fn with_path(path: impl Into<String>) -> Self {
        Self::new(BusConfig::new(path))
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Applies mode, word size and clock speed to the open device.
    ///
    /// The driver validates each setting on its own, so they are applied
    /// one ioctl at a time in mode, bits, speed order.
    pub fn configure(&mut self) -> Result<()> {
        let Some(mode) = mode_flags(self.config.mode) else {
            return Err(Error::Config {
                param: "mode",
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown clock mode {}", self.config.mode),
                )
                .into(),
            });
        };
        let dev = self.dev.as_mut().ok_or(Error::NotOpen)?;

        dev.configure(&SpidevOptions::new().mode(mode).build())
            .map_err(|e| Error::Config {
                param: "mode",
                source: e.into(),
            })?;
        dev.configure(
            &SpidevOptions::new()
                .bits_per_word(self.config.bits_per_word)
                .build(),
        )
        .map_err(|e| Error::Config {
            param: "bits per word",
            source: e.into(),
        })?;
        dev.configure(&SpidevOptions::new().max_speed_hz(self.config.speed_hz).build())
            .map_err(|e| Error::Config {
                param: "clock speed",
                source: e.into(),
            })?;

        Ok(())
    }
}

/// Maps a 0-3 mode selector to the driver's mode flags.
const fn mode_flags(mode: u8) -> Option<SpiModeFlags> {
    match mode {
        0 => Some(SpiModeFlags::SPI_MODE_0),
        1 => Some(SpiModeFlags::SPI_MODE_1),
        2 => Some(SpiModeFlags::SPI_MODE_2),
        3 => Some(SpiModeFlags::SPI_MODE_3),
        _ => None,
    }
}

impl Transport for BusTransport {
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.dev.is_some() {
                return Ok(());
            }

            tracing::info!("opening bus device: {}", self.config.path);

            let dev = Spidev::open(&self.config.path).map_err(|e| Error::Open {
                path: self.config.path.clone(),
                source: e.into(),
            })?;
            self.dev = Some(dev);

            if let Err(e) = self.configure() {
                self.dev = None;
                return Err(e);
            }

            tracing::info!("bus device ready");
            Ok(())
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            match self.dev.take() {
                Some(dev) => {
                    tracing::info!("closing bus device");
                    drop(dev);
                    Ok(())
                }
                None => Err(Error::NotOpen),
            }
        })
    }

    fn is_open(&self) -> bool {
        self.dev.is_some()
    }
}

impl FullDuplex for BusTransport {
    fn transfer(&mut self, tx: Bytes) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            let dev = self.dev.take().ok_or(Error::NotOpen)?;

            tracing::trace!("bus transfer: {} bytes", tx.len());

            // The ioctl blocks while bytes are clocked, so it runs on the
            // blocking pool; the handle moves out and back in.
            let (dev, outcome) = task::spawn_blocking(move || {
                let mut dev = dev;
                let mut rx = vec![0u8; tx.len()];
                let outcome = {
                    let mut xfer = SpidevTransfer::read_write(&tx, &mut rx);
                    dev.transfer(&mut xfer)
                };
                (dev, outcome.map(|()| rx))
            })
            .await
            .map_err(|e| Error::Transfer(io::Error::other(e)))?;

            self.dev = Some(dev);
            let rx = outcome.map_err(Error::Transfer)?;
            Ok(Bytes::from(rx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_config_defaults() {
        let config = BusConfig::new("/dev/spidev1.0");
        assert_eq!(config.path, "/dev/spidev1.0");
        assert_eq!(config.mode, DEFAULT_MODE);
        assert_eq!(config.bits_per_word, DEFAULT_BITS_PER_WORD);
        assert_eq!(config.speed_hz, DEFAULT_SPEED_HZ);
        assert_eq!(config.settle_delay, DEFAULT_SETTLE_DELAY);
    }

    #[test]
    fn test_bus_config_builder() {
        let config = BusConfig::new("/dev/spidev0.1")
            .mode(3)
            .bits_per_word(16)
            .speed_hz(1_000_000)
            .settle_delay(Duration::from_millis(10));
        assert_eq!(config.mode, 3);
        assert_eq!(config.bits_per_word, 16);
        assert_eq!(config.speed_hz, 1_000_000);
        assert_eq!(config.settle_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(mode_flags(0), Some(SpiModeFlags::SPI_MODE_0));
        assert_eq!(mode_flags(3), Some(SpiModeFlags::SPI_MODE_3));
        assert_eq!(mode_flags(4), None);
    }

    #[tokio::test]
    async fn test_close_without_open_fails() {
        let mut transport = BusTransport::with_path("/dev/spidev1.0");
        assert!(!transport.is_open());
        assert!(matches!(transport.close().await, Err(Error::NotOpen)));
    }
}
