//! Sutter Instrument stage support
//!
//! The controller speaks a binary protocol: single-byte opcodes followed by
//! little-endian `i32` coordinates, replies terminated by a carriage return.

pub mod command_creator;
pub mod driver;
pub mod response_parser;

pub use driver::SutterDriver;

/// USB vendor ID of Sutter Instrument controllers
pub const SUTTER_VENDOR_ID: u16 = 4930;

/// USB product ID of Sutter Instrument controllers
pub const SUTTER_PRODUCT_ID: u16 = 1;

/// Native resolution of the stage
pub const MICROSTEPS_PER_MICRON: f64 = 16.0;
