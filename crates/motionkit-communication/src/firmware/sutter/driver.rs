//! Sutter stage driver
//!
//! Implements [`MotionDriver`] over any [`SerialTransport`]. Each operation is
//! one request/reply exchange; relative moves and homing use the trait's
//! default read-then-move behaviour.

use super::{command_creator, response_parser, MICROSTEPS_PER_MICRON};
use crate::communication::serial::SerialPortTransport;
use crate::{ConnectionParams, SerialTransport, SutterDebugPort};
use motionkit_core::{ConnectionError, Error, MotionDriver, Result, StepPosition};
use std::time::Duration;

/// Driver for Sutter Instrument MP-285/MPC-200 stages
pub struct SutterDriver {
    port: Box<dyn SerialTransport>,
    timeout: Duration,
}

impl SutterDriver {
    /// Create a driver over an arbitrary transport
    pub fn new(port: Box<dyn SerialTransport>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Create a driver for a real serial port
    pub fn serial(params: ConnectionParams) -> Self {
        let timeout = params.timeout;
        Self::new(Box::new(SerialPortTransport::new(params)), timeout)
    }

    /// Create a driver over the in-memory controller
    pub fn debug() -> Self {
        Self::new(
            Box::new(SutterDebugPort::new()),
            ConnectionParams::default().timeout,
        )
    }

    /// Reply timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `command` and read a reply of `reply_len` bytes
    ///
    /// Timeouts are relabelled with `operation` so the caller sees what was
    /// being attempted.
    fn exchange(&mut self, operation: &str, command: &[u8], reply_len: usize) -> Result<Vec<u8>> {
        self.port.write_bytes(command)?;
        self.port
            .read_bytes(reply_len, self.timeout)
            .map_err(|e| match e {
                Error::Connection(ConnectionError::TransportTimeout {
                    elapsed_ms,
                    expected,
                    received,
                    ..
                }) => {
                    tracing::warn!(
                        "Sutter {} on {} timed out ({} of {} bytes)",
                        operation,
                        self.port.name(),
                        received,
                        expected
                    );
                    ConnectionError::TransportTimeout {
                        operation: operation.to_string(),
                        elapsed_ms,
                        expected,
                        received,
                    }
                    .into()
                }
                other => other,
            })
    }
}

impl MotionDriver for SutterDriver {
    fn name(&self) -> String {
        format!("sutter@{}", self.port.name())
    }

    fn steps_per_micron(&self) -> f64 {
        MICROSTEPS_PER_MICRON
    }

    fn do_initialize_device(&mut self) -> Result<()> {
        self.port.open()?;
        match self.do_get_position() {
            Ok(position) => {
                tracing::info!("Sutter stage on {} at {}", self.port.name(), position);
                Ok(())
            }
            Err(e) => {
                if let Err(close_error) = self.port.close() {
                    tracing::warn!(
                        "Failed to close {} after handshake error: {}",
                        self.port.name(),
                        close_error
                    );
                }
                Err(e)
            }
        }
    }

    fn do_shutdown_device(&mut self) -> Result<()> {
        self.port.close()
    }

    fn do_get_position(&mut self) -> Result<StepPosition> {
        let reply = self.exchange(
            "read position",
            &command_creator::position_command(),
            response_parser::POSITION_REPLY_LEN,
        )?;
        Ok(response_parser::parse_position_reply(&reply)?)
    }

    fn do_move_to(&mut self, position: StepPosition) -> Result<()> {
        let reply = self.exchange(
            "move",
            &command_creator::move_command(&position),
            response_parser::MOVE_REPLY_LEN,
        )?;
        Ok(response_parser::parse_move_reply(&reply)?)
    }
}

impl std::fmt::Debug for SutterDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SutterDriver")
            .field("port", &self.port.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
