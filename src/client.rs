//! Main [`Copro`] client implementation.
//!
//! This module provides the high-level [`Copro`] client that combines a
//! transport and the exchange sequencing into a unified interface for
//! driving an arithmetic co-processor.

use crate::error::Result;
use crate::protocol::{Exchange, Op, Record};
use crate::transport::{BusConfig, BusTransport, StreamConfig, StreamTransport, Transport};

/// Client for an arithmetic co-processor peripheral.
///
/// One client drives one session sequentially; there is no internal
/// locking because no concurrent access is supported.
pub struct Copro<T> {
    transport: T,
}

impl Copro<BusTransport> {
    /// Creates a client for a co-processor on a clocked bus.
    ///
    /// # Arguments
    ///
    /// * `path` - Bus device path (e.g., "/dev/spidev1.0")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn bus(path: impl Into<String>) -> Self {
        Self::with_transport(BusTransport::with_path(path))
    }

    /// Creates a bus client with custom configuration.
    #[must_use]
    pub fn with_bus_config(config: BusConfig) -> Self {
        Self::with_transport(BusTransport::new(config))
    }
}

impl Copro<StreamTransport> {
    /// Creates a client for a co-processor on a serial stream.
    ///
    /// # Arguments
    ///
    /// * `path` - Stream device path (e.g., "/dev/ttyS1")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn stream(path: impl Into<String>) -> Self {
        Self::with_transport(StreamTransport::with_path(path))
    }

    /// Creates a stream client with custom configuration.
    #[must_use]
    pub fn with_stream_config(config: StreamConfig) -> Self {
        Self::with_transport(StreamTransport::new(config))
    }
}

impl<T: Transport + Exchange> Copro<T> {
    /// Creates a client over an already-built transport.
    #[must_use]
    pub const fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Opens and configures the device.
    pub async fn connect(&mut self) -> Result<()> {
        self.transport.open().await
    }

    /// Releases the device.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Returns true if the device is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// Sends one arithmetic request and returns the peripheral's reply.
    pub async fn compute(&mut self, x: i32, y: i32, op: Op) -> Result<Record> {
        self.compute_raw(x, y, op.into()).await
    }

    /// Sends a request with an arbitrary operation byte.
    ///
    /// The byte goes out unvalidated; the peripheral decides what an
    /// unknown operation means.
    pub async fn compute_raw(&mut self, x: i32, y: i32, operation: u8) -> Result<Record> {
        let request = Record::request(x, y, operation);
        tracing::debug!("request: {request}");

        let reply = self.transport.perform(request).await?;
        tracing::debug!("reply: {reply}");
        Ok(reply)
    }

    // ==================== Convenience Methods ====================

    /// Computes `x + y` on the peripheral.
    pub async fn add(&mut self, x: i32, y: i32) -> Result<u32> {
        Ok(self.compute(x, y, Op::Add).await?.result)
    }

    /// Computes `x - y` on the peripheral.
    pub async fn sub(&mut self, x: i32, y: i32) -> Result<u32> {
        Ok(self.compute(x, y, Op::Sub).await?.result)
    }

    /// Computes `x * y` on the peripheral.
    pub async fn mul(&mut self, x: i32, y: i32) -> Result<u32> {
        Ok(self.compute(x, y, Op::Mul).await?.result)
    }

    /// Computes `x / y` on the peripheral.
    pub async fn div(&mut self, x: i32, y: i32) -> Result<u32> {
        Ok(self.compute(x, y, Op::Div).await?.result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct MockTransport {
        open: bool,
        requests: Vec<Record>,
        reply: Record,
    }

    impl Transport for MockTransport {
        fn open(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            self.open = true;
            Box::pin(async { Ok(()) })
        }

        fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let was_open = self.open;
            self.open = false;
            Box::pin(async move {
                if was_open { Ok(()) } else { Err(Error::NotOpen) }
            })
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    impl Exchange for MockTransport {
        fn perform(
            &mut self,
            request: Record,
        ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + '_>> {
            self.requests.push(request);
            let reply = self.reply;
            Box::pin(async move { Ok(reply) })
        }
    }

    #[tokio::test]
    async fn test_compute_builds_request_and_returns_reply() {
        let mut transport = MockTransport::default();
        transport.reply = Record {
            x: 7,
            y: 3,
            operation: b'+',
            result: 10,
        };

        let mut client = Copro::with_transport(transport);
        client.connect().await.unwrap();
        assert!(client.is_connected());

        let reply = client.compute(7, 3, Op::Add).await.unwrap();
        assert_eq!(reply.result, 10);
        assert_eq!(
            client.transport.requests,
            vec![Record::request(7, 3, b'+')]
        );
    }

    #[tokio::test]
    async fn test_convenience_methods_return_result_field() {
        let mut transport = MockTransport::default();
        transport.reply = Record {
            x: 6,
            y: 7,
            operation: b'*',
            result: 42,
        };

        let mut client = Copro::with_transport(transport);
        client.connect().await.unwrap();
        assert_eq!(client.mul(6, 7).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_raw_operation_byte_is_not_validated() {
        let mut client = Copro::with_transport(MockTransport::default());
        client.connect().await.unwrap();

        client.compute_raw(1, 2, b'%').await.unwrap();
        assert_eq!(client.transport.requests[0].operation, b'%');
    }

    #[tokio::test]
    async fn test_close_twice_reports_failure() {
        let mut client = Copro::with_transport(MockTransport::default());
        client.connect().await.unwrap();

        assert!(client.disconnect().await.is_ok());
        assert!(matches!(client.disconnect().await, Err(Error::NotOpen)));
        assert!(!client.is_connected());
    }
}
