//! # MotionKit Communication
//!
//! Serial transport and firmware drivers for MotionKit.
//! Supports serial/USB connections through the `serialport` crate and an
//! in-memory simulator for running drivers without hardware.
//! Includes the Sutter Instrument stage driver.

pub mod communication;
pub mod firmware;

pub use communication::{
    debug::{DebugStage, SutterDebugPort},
    serial::{find_sutter_ports, list_ports, resolve_port, SerialPortInfo, SerialPortTransport},
    ConnectionParams, SerialParity, SerialTransport,
};

pub use firmware::sutter::{
    SutterDriver, MICROSTEPS_PER_MICRON, SUTTER_PRODUCT_ID, SUTTER_VENDOR_ID,
};
