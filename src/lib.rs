//! # MotionKit
//!
//! Control library for laboratory motion hardware with support for:
//! - An in-process notification hub for device state changes
//! - Three-axis linear stages driven in native steps or in microns
//! - Sutter Instrument stages over USB serial, plus in-memory stand-ins
//!
//! ## Architecture
//!
//! MotionKit is organized as a workspace with multiple crates:
//!
//! 1. **motionkit-core** - Identity, errors, units, notification hub, device contract
//! 2. **motionkit-communication** - Serial transport and the Sutter firmware driver
//! 3. **motionkit-settings** - Configuration files
//! 4. **motionkit** - Device factory, logging setup and the command-line binary

use std::sync::Arc;

pub use motionkit_communication::{
    find_sutter_ports, list_ports, ConnectionParams, DebugStage, SerialPortInfo, SerialTransport,
    SutterDebugPort, SutterDriver,
};

pub use motionkit_core::{
    notification_center, Axes, Calibration, ConnectionError, DebugMotionDriver, DeviceError,
    DeviceNotification, DeviceState, Error, LinearMotionDevice, MicronPosition,
    MotionDriver, Notification, NotificationCenter, ObjectId, Result, StepPosition, UserInfo,
};

pub use motionkit_settings::{default_config_path, Config, DeviceKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Port name that selects the in-memory Sutter controller
pub const SIMULATED_PORT: &str = "debug";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for command results
/// - RUST_LOG environment variable support (defaults to `info`)
/// - Pretty or JSON formatting
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_current_span(false),
            )
            .try_init()?,
    }

    Ok(())
}

/// Build the device described by `config`, posting to `center`
///
/// The device is returned unconfigured; call
/// [`LinearMotionDevice::initialize_device`] before moving it. A Sutter device
/// whose port is [`SIMULATED_PORT`] talks to the in-memory controller.
pub fn build_device(
    config: &Config,
    center: Arc<NotificationCenter>,
) -> Result<LinearMotionDevice> {
    config.validate()?;
    let connection = &config.connection;

    let driver: Box<dyn MotionDriver> = match config.device.kind {
        DeviceKind::Debug => Box::new(DebugMotionDriver::new()),
        DeviceKind::Sutter if connection.port.eq_ignore_ascii_case(SIMULATED_PORT) => {
            Box::new(SutterDriver::new(
                Box::new(SutterDebugPort::new()),
                connection.timeout(),
            ))
        }
        DeviceKind::Sutter => Box::new(SutterDriver::serial(
            ConnectionParams::new(&connection.port)
                .with_baud_rate(connection.baud_rate)
                .with_timeout(connection.timeout()),
        )),
    };

    tracing::debug!(
        "Building {} device ({} steps/µm)",
        config.device.kind,
        config.device.steps_per_micron
    );
    Ok(LinearMotionDevice::new(driver)?
        .with_center(center)
        .with_calibration(config.device.calibration()?))
}
