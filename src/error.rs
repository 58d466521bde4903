//! Error types for the copro library.

use thiserror::Error;

/// The main error type for copro operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Device path could not be opened.
    #[error("failed to open device {path}: {source}")]
    Open {
        /// Path that was attempted.
        path: String,
        /// Underlying failure.
        source: DeviceError,
    },

    /// The device rejected a configuration parameter.
    #[error("failed to apply {param}: {source}")]
    Config {
        /// Name of the rejected parameter.
        param: &'static str,
        /// Underlying failure.
        source: DeviceError,
    },

    /// A clocked-bus transaction failed.
    #[error("bus transfer failed: {0}")]
    Transfer(#[source] std::io::Error),

    /// A stream write or read failed.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires an open session.
    #[error("device is not open")]
    NotOpen,
}

/// Device-layer failure from the serial stack or the OS.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Serial port error.
    #[error(transparent)]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for copro operations.
pub type Result<T> = std::result::Result<T, Error>;
