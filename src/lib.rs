//! # copro
//!
//! A Rust client library for arithmetic co-processor peripherals attached
//! over SPI or UART.
//!
//! The peripheral accepts a fixed 13-byte record carrying two signed
//! operands and an operator, computes the result, and hands the same
//! record back with the result field filled in. This library implements
//! the record codec, both transports, and the request/reply sequencing
//! each transport needs.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - One logical exchange call over either transport
//! - Explicit, layout-independent wire codec
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use copro::{Copro, Op};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), copro::Error> {
//!     // Connect to a co-processor on the serial line
//!     let mut client = Copro::stream("/dev/ttyS1");
//!     client.connect().await?;
//!
//!     let reply = client.compute(7, 3, Op::Add).await?;
//!     println!("7 + 3 = {}", reply.result);
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Record codec, operator codes, and exchange sequencing
//! - [`transport`] - Transport implementations (clocked bus, serial stream)
//! - [`client`] - High-level [`Copro`] client

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use client::Copro;
pub use error::{DeviceError, Error, Result};
pub use protocol::{Exchange, Op, RECORD_LEN, Record};
pub use transport::{
    BusConfig, BusTransport, FullDuplex, HalfDuplex, StreamConfig, StreamTransport, Transport,
};
