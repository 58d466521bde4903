//! Transport layer for co-processor communication.
//!
//! Two transports implement the same logical contract with different
//! guarantees: a full-duplex clocked bus (SPI) where every written byte
//! position has a simultaneously received byte, and a half-duplex
//! asynchronous stream (UART) with independent write and read calls.

pub mod bus;
pub mod stream;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Result;

/// Trait for transport session lifecycle.
///
/// A session exclusively owns one device handle from open to close. All
/// transfer operations require an open session, and configuration is
/// applied before the first transfer.
pub trait Transport: Send + Sync {
    /// Opens and configures the device.
    fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Releases the device handle.
    ///
    /// Closing a session that is not open reports an error, never a
    /// crash.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Returns true if the session is open.
    fn is_open(&self) -> bool;
}

/// Full-duplex clocked transfers.
pub trait FullDuplex: Transport {
    /// One atomic clocked transaction: transmits `tx` and captures the
    /// same number of simultaneously received bytes.
    ///
    /// Received byte `i` is whatever the peripheral shifted out while
    /// `tx[i]` was clocked in; it is not an echo.
    fn transfer(&mut self, tx: Bytes) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;
}

/// Half-duplex stream writes and reads.
pub trait HalfDuplex: Transport {
    /// Writes `data` and returns the number of bytes accepted.
    ///
    /// A short write is not retried here; the caller sees the count.
    fn write(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>>;

    /// Reads up to `max_len` bytes, subject to the configured read
    /// completion policy. May return fewer bytes than requested.
    fn read(&mut self, max_len: usize)
    -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;
}

pub use bus::{BusConfig, BusTransport};
pub use stream::{StreamConfig, StreamTransport};
