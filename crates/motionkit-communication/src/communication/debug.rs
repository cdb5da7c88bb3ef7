//! In-memory Sutter controller
//!
//! [`SutterDebugPort`] answers the same binary commands as a real controller
//! so the Sutter driver can be exercised without hardware.

use crate::firmware::sutter::{command_creator, response_parser};
use crate::SerialTransport;
use motionkit_core::{ConnectionError, Result, StepPosition};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to the simulated stage
///
/// Clones observe the same stage, so a test can keep one after the port has
/// been handed to a driver.
#[derive(Debug, Clone, Default)]
pub struct DebugStage {
    position: Arc<Mutex<StepPosition>>,
}

impl DebugStage {
    /// Current stage position
    pub fn position(&self) -> StepPosition {
        *self.position.lock()
    }

    /// Teleport the stage
    pub fn set_position(&self, position: StepPosition) {
        *self.position.lock() = position;
    }
}

/// Simulated Sutter serial port
#[derive(Debug)]
pub struct SutterDebugPort {
    name: String,
    open: bool,
    stage: DebugStage,
    input: Vec<u8>,
    output: VecDeque<u8>,
}

impl SutterDebugPort {
    /// Create a closed port with the stage at the origin
    pub fn new() -> Self {
        Self {
            name: "debug".to_string(),
            open: false,
            stage: DebugStage::default(),
            input: Vec::new(),
            output: VecDeque::new(),
        }
    }

    /// Handle to the simulated stage
    pub fn stage(&self) -> DebugStage {
        self.stage.clone()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(ConnectionError::NotOpen {
                port: self.name.clone(),
            }
            .into())
        }
    }

    /// Execute every complete command waiting in the input buffer
    fn process_input(&mut self) {
        loop {
            match self.input.first().copied() {
                Some(command_creator::MOVE_OPCODE) => {
                    if self.input.len() < command_creator::MOVE_COMMAND_LEN {
                        return;
                    }
                    let command: Vec<u8> = self
                        .input
                        .drain(..command_creator::MOVE_COMMAND_LEN)
                        .collect();
                    let position = response_parser::decode_position(&command[1..]);
                    tracing::trace!("Debug stage moving to {}", position);
                    self.stage.set_position(position);
                    self.output.push_back(response_parser::TERMINATOR);
                }
                Some(command_creator::POSITION_OPCODE) => {
                    self.input.remove(0);
                    let mut reply = command_creator::encode_position(&self.stage.position());
                    reply.push(response_parser::TERMINATOR);
                    self.output.extend(reply);
                }
                Some(other) => {
                    tracing::warn!("Debug port dropping unknown command byte {:#04x}", other);
                    self.input.remove(0);
                }
                None => return,
            }
        }
    }
}

impl Default for SutterDebugPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialTransport for SutterDebugPort {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(ConnectionError::AlreadyOpen {
                port: self.name.clone(),
            }
            .into());
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        self.input.clear();
        self.output.clear();
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        self.input.extend_from_slice(data);
        self.process_input();
        Ok(data.len())
    }

    fn read_bytes(&mut self, length: usize, timeout: Duration) -> Result<Vec<u8>> {
        self.ensure_open()?;
        if self.output.len() < length {
            let received = self.output.len();
            self.output.clear();
            return Err(ConnectionError::TransportTimeout {
                operation: "read".to_string(),
                elapsed_ms: timeout.as_millis() as u64,
                expected: length,
                received,
            }
            .into());
        }
        Ok(self.output.drain(..length).collect())
    }
}
