//! MotionKit Settings Crate
//!
//! Handles configuration of the serial connection and of the motion device.

pub mod config;

pub use config::{default_config_path, Config, ConnectionSettings, DeviceKind, DeviceSettings};
