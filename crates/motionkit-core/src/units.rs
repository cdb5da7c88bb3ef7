//! Unit conversion utilities
//!
//! Handles conversion between native motor steps and physical microns.
//! Each device carries one [`Calibration`], fixed at construction.

use crate::error::DeviceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native step count on one axis (signed 32-bit, as sent on the wire)
pub type Steps = i32;

/// Three-axis coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes<T> {
    /// X-axis value
    pub x: T,
    /// Y-axis value
    pub y: T,
    /// Z-axis value
    pub z: T,
}

/// Position or displacement in native steps
pub type StepPosition = Axes<Steps>;

/// Position or displacement in microns
pub type MicronPosition = Axes<f64>;

impl<T> Axes<T> {
    /// Create a coordinate from its three components
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Copy> Axes<T> {
    /// Components as an array, in X, Y, Z order
    pub fn to_array(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }
}

impl StepPosition {
    /// The origin
    pub const ORIGIN: StepPosition = Axes::new(0, 0, 0);

    /// Add a displacement, failing if any axis leaves the representable range
    pub fn checked_add(&self, delta: &StepPosition) -> Result<StepPosition, DeviceError> {
        let axis = |name: &str, a: Steps, b: Steps| {
            a.checked_add(b).ok_or_else(|| {
                DeviceError::invalid_argument(format!(
                    "{} axis overflows: {} + {}",
                    name, a, b
                ))
            })
        };
        Ok(Axes::new(
            axis("x", self.x, delta.x)?,
            axis("y", self.y, delta.y)?,
            axis("z", self.z, delta.z)?,
        ))
    }
}

impl<T> From<(T, T, T)> for Axes<T> {
    fn from((x, y, z): (T, T, T)) -> Self {
        Self::new(x, y, z)
    }
}

impl<T> From<[T; 3]> for Axes<T> {
    fn from([x, y, z]: [T; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl<T> From<Axes<T>> for (T, T, T) {
    fn from(axes: Axes<T>) -> Self {
        (axes.x, axes.y, axes.z)
    }
}

impl<T: Copy> TryFrom<&[T]> for Axes<T> {
    type Error = DeviceError;

    fn try_from(values: &[T]) -> Result<Self, Self::Error> {
        match values {
            [x, y, z] => Ok(Self::new(*x, *y, *z)),
            _ => Err(DeviceError::invalid_argument(format!(
                "expected 3 coordinates, got {}",
                values.len()
            ))),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Axes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Fixed steps-per-micron ratio of a device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    steps_per_micron: f64,
}

impl Calibration {
    /// Sixteen microsteps per micron, the native resolution of Sutter stages
    pub const SIXTEEN_MICROSTEPS: Calibration = Calibration {
        steps_per_micron: 16.0,
    };

    /// Create a calibration, rejecting non-positive or non-finite factors
    pub fn new(steps_per_micron: f64) -> Result<Self, DeviceError> {
        if !steps_per_micron.is_finite() || steps_per_micron <= 0.0 {
            return Err(DeviceError::invalid_argument(format!(
                "steps per micron must be positive and finite, got {}",
                steps_per_micron
            )));
        }
        Ok(Self { steps_per_micron })
    }

    /// The steps-per-micron factor
    pub fn steps_per_micron(&self) -> f64 {
        self.steps_per_micron
    }

    /// Convert a step position to microns
    pub fn to_microns(&self, steps: &StepPosition) -> MicronPosition {
        let convert = |s: Steps| f64::from(s) / self.steps_per_micron;
        Axes::new(convert(steps.x), convert(steps.y), convert(steps.z))
    }

    /// Convert microns to the nearest step position
    ///
    /// Fails if a component is not finite or does not fit in [`Steps`].
    pub fn to_steps(&self, microns: &MicronPosition) -> Result<StepPosition, DeviceError> {
        let convert = |name: &str, m: f64| -> Result<Steps, DeviceError> {
            let steps = (m * self.steps_per_micron).round();
            if !steps.is_finite() || steps < f64::from(Steps::MIN) || steps > f64::from(Steps::MAX)
            {
                return Err(DeviceError::invalid_argument(format!(
                    "{} axis value {}µm is not representable in steps",
                    name, m
                )));
            }
            Ok(steps as Steps)
        };
        Ok(Axes::new(
            convert("x", microns.x)?,
            convert("y", microns.y)?,
            convert("z", microns.z)?,
        ))
    }
}
