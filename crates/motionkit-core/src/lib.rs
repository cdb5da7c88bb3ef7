//! # MotionKit Core
//!
//! Core types for controlling laboratory motion hardware.
//! Provides the notification hub, identity tokens, unit conversion
//! and the motion device contract shared by every stage driver.

pub mod device;
pub mod error;
pub mod identity;
pub mod notification;
pub mod units;

pub use device::{DebugMotionDriver, DeviceState, LinearMotionDevice, MotionDriver};

pub use error::{ConnectionError, DeviceError, Error, ObserverError, Result};

pub use identity::ObjectId;

// Re-export the notification hub for convenience
pub use notification::{
    notification_center, DeviceNotification, Notification, NotificationCenter, ObserverCallback,
    ObserverKey, ObserverRegistration, UserInfo,
};

pub use units::{Axes, Calibration, MicronPosition, StepPosition, Steps};
