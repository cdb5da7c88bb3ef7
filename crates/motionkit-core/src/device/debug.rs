//! In-memory debug driver
//!
//! Stands in for real hardware in tests and demos. Moves are applied
//! instantly to a stored position.

use super::MotionDriver;
use crate::error::Result;
use crate::units::{Calibration, StepPosition};

/// Motion driver that keeps its position in memory
#[derive(Debug, Clone, Default)]
pub struct DebugMotionDriver {
    position: StepPosition,
}

impl DebugMotionDriver {
    /// Create a driver sitting at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver sitting at `position`
    pub fn at(position: StepPosition) -> Self {
        Self { position }
    }
}

impl MotionDriver for DebugMotionDriver {
    fn name(&self) -> String {
        "debug".to_string()
    }

    fn steps_per_micron(&self) -> f64 {
        Calibration::SIXTEEN_MICROSTEPS.steps_per_micron()
    }

    fn do_initialize_device(&mut self) -> Result<()> {
        tracing::debug!("Debug driver ready at {}", self.position);
        Ok(())
    }

    fn do_shutdown_device(&mut self) -> Result<()> {
        Ok(())
    }

    fn do_get_position(&mut self) -> Result<StepPosition> {
        Ok(self.position)
    }

    fn do_move_to(&mut self, position: StepPosition) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn do_move_by(&mut self, displacement: StepPosition) -> Result<()> {
        self.position = self.position.checked_add(&displacement)?;
        Ok(())
    }

    fn do_home(&mut self) -> Result<()> {
        self.position = StepPosition::ORIGIN;
        Ok(())
    }
}
