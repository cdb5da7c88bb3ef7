//! Firmware implementations for motion controllers
//!
//! Supported controllers:
//! - Sutter Instrument: binary serial protocol of the MP-285/MPC-200 family

pub mod sutter;

pub use sutter::SutterDriver;
