//! Transport layer
//!
//! The [`SerialTransport`] trait is the only thing firmware drivers know about
//! the wire. Two implementations are provided:
//! - [`serial::SerialPortTransport`] for real hardware via the `serialport` crate
//! - [`debug::SutterDebugPort`], an in-memory Sutter controller simulator

pub mod debug;
pub mod serial;

use motionkit_core::Result;
use std::time::Duration;

/// Byte-level transport used by firmware drivers
///
/// Implementations do not retry; a missing reply surfaces as
/// `ConnectionError::TransportTimeout`.
pub trait SerialTransport: Send {
    /// Port name used in logs and errors
    fn name(&self) -> String;

    /// Whether the port is currently open
    fn is_open(&self) -> bool;

    /// Open the port; fails if it is already open
    fn open(&mut self) -> Result<()>;

    /// Close the port; closing a closed port is harmless
    fn close(&mut self) -> Result<()>;

    /// Write the whole buffer
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize>;

    /// Read exactly `length` bytes, waiting at most `timeout`
    fn read_bytes(&mut self, length: usize, timeout: Duration) -> Result<Vec<u8>>;
}

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialParity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Parameters used to open a serial connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionParams {
    /// Port path, or `"auto"` to discover a Sutter controller
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware flow control
    pub flow_control: bool,
    /// Reply timeout
    pub timeout: Duration,
}

impl ConnectionParams {
    /// Port name that requests discovery instead of a fixed path
    pub const AUTO_PORT: &'static str = "auto";

    /// Parameters for `port` with Sutter defaults
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the reply timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: Self::AUTO_PORT.to_string(),
            baud_rate: 128_000,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
            timeout: Duration::from_millis(5000),
        }
    }
}
