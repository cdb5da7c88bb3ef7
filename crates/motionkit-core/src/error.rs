//! Error handling for MotionKit
//!
//! Provides error types for every layer of the library:
//! - Device errors (lifecycle and argument validation)
//! - Connection errors (serial transport)
//! - Observer errors (failures raised inside notification callbacks)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Error type returned by observer callbacks
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Device error type
///
/// Represents errors raised by the motion device contract itself,
/// independent of the transport used to reach the hardware.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Operation attempted outside the initialized/ready lifecycle window
    #[error("Device not ready for {operation} (state: {state})")]
    NotReady {
        /// The operation that was attempted.
        operation: String,
        /// The lifecycle state the device was in.
        state: String,
    },

    /// Malformed coordinates or unrepresentable positions
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// The reason the argument was rejected.
        reason: String,
    },
}

impl DeviceError {
    /// Build an `InvalidArgument` error from a message
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        DeviceError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Connection error type
///
/// Represents errors raised by the serial transport collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// No port matched the requested name or USB identifiers
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Port is already open
    #[error("Port already open: {port}")]
    AlreadyOpen {
        /// The name of the port.
        port: String,
    },

    /// Port has not been opened
    #[error("Port not open: {port}")]
    NotOpen {
        /// The name of the port.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// The transport did not deliver the expected bytes in time
    #[error("{operation} timed out after {elapsed_ms}ms ({received} of {expected} bytes received)")]
    TransportTimeout {
        /// The operation that was waiting for data.
        operation: String,
        /// Time spent waiting, in milliseconds.
        elapsed_ms: u64,
        /// Number of bytes requested.
        expected: usize,
        /// Number of bytes actually received.
        received: usize,
    },

    /// The device replied with bytes that do not fit the protocol
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// The reason the response was rejected.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },
}

/// Main error type for MotionKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Device error
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// An observer callback failed while a notification was being dispatched
    #[error("Observer of '{notification}' failed: {source}")]
    Observer {
        /// Name of the notification being dispatched.
        notification: String,
        /// The error returned by the callback.
        #[source]
        source: ObserverError,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transport timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::TransportTimeout { .. })
        )
    }

    /// Check if this is a lifecycle error
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::Device(DeviceError::NotReady { .. }))
    }

    /// Check if this is an argument validation error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::Device(DeviceError::InvalidArgument { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this error was raised by an observer callback
    pub fn is_observer_error(&self) -> bool {
        matches!(self, Error::Observer { .. })
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
