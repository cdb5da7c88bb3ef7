//! Serial port communication implementation
//!
//! Provides low-level serial port operations for direct hardware connection
//! to motion controllers via USB or RS-232.
//!
//! Supports:
//! - Port enumeration and discovery by USB identifiers
//! - Baud rate, parity, stop bit and flow control configuration
//! - Blocking reads with an overall deadline

use crate::firmware::sutter::{SUTTER_PRODUCT_ID, SUTTER_VENDOR_ID};
use crate::{ConnectionParams, SerialParity, SerialTransport};
use motionkit_core::{ConnectionError, Result};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }

    /// Whether the port belongs to a Sutter Instrument controller
    pub fn is_sutter(&self) -> bool {
        self.vid == Some(SUTTER_VENDOR_ID) && self.pid == Some(SUTTER_PRODUCT_ID)
    }
}

/// List available serial ports on the system
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::SerialError {
            reason: format!("Failed to enumerate ports: {}", e),
        }
    })?;

    Ok(ports
        .iter()
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, get_port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb_info) => {
                    let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                    if let Some(ref mfg) = usb_info.manufacturer {
                        info = info.with_manufacturer(mfg);
                    }
                    if let Some(ref serial) = usb_info.serial_number {
                        info = info.with_serial_number(serial);
                    }
                    info
                }
                _ => info,
            }
        })
        .collect())
}

/// List the ports that belong to Sutter Instrument controllers
pub fn find_sutter_ports() -> Result<Vec<SerialPortInfo>> {
    Ok(list_ports()?
        .into_iter()
        .filter(SerialPortInfo::is_sutter)
        .collect())
}

/// Resolve a configured port name to a device path
///
/// `"auto"` (any case) selects the first Sutter controller found.
pub fn resolve_port(port: &str) -> Result<String> {
    if !port.eq_ignore_ascii_case(ConnectionParams::AUTO_PORT) {
        return Ok(port.to_string());
    }

    let found = find_sutter_ports()?;
    match found.first() {
        Some(info) => {
            tracing::debug!(
                "Resolved '{}' to {} ({})",
                port,
                info.port_name,
                info.description
            );
            Ok(info.port_name.clone())
        }
        None => Err(ConnectionError::PortNotFound {
            port: format!(
                "{} (no device with VID {:#06x} / PID {:#06x})",
                port, SUTTER_VENDOR_ID, SUTTER_PRODUCT_ID
            ),
        }
        .into()),
    }
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Convert a parity setting to serialport format
fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

/// Serial transport backed by the `serialport` crate
pub struct SerialPortTransport {
    params: ConnectionParams,
    resolved: Option<String>,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialPortTransport {
    /// Create a closed transport for the given parameters
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            resolved: None,
            port: None,
        }
    }

    /// Connection parameters
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>> {
        let name = self.name();
        self.port
            .as_mut()
            .ok_or_else(|| ConnectionError::NotOpen { port: name }.into())
    }
}

impl SerialTransport for SerialPortTransport {
    fn name(&self) -> String {
        self.resolved
            .clone()
            .unwrap_or_else(|| self.params.port.clone())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Err(ConnectionError::AlreadyOpen { port: self.name() }.into());
        }

        let path = resolve_port(&self.params.port)?;
        let params = &self.params;
        let data_bits = match params.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(ConnectionError::FailedToOpen {
                    port: path,
                    reason: format!("Invalid data bits: {}", other),
                }
                .into())
            }
        };
        let stop_bits = match params.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => {
                return Err(ConnectionError::FailedToOpen {
                    port: path,
                    reason: format!("Invalid stop bits: {}", other),
                }
                .into())
            }
        };

        let builder = serialport::new(&path, params.baud_rate)
            .timeout(params.timeout)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            });

        match builder.open() {
            Ok(port) => {
                tracing::debug!("Opened {} at {} baud", path, params.baud_rate);
                self.port = Some(port);
                self.resolved = Some(path);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", path, e);
                Err(ConnectionError::FailedToOpen {
                    port: path,
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            tracing::debug!("Closed {}", self.name());
        }
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port_mut()?;
        port.write_all(data)?;
        port.flush()?;
        tracing::trace!("TX {:02x?}", data);
        Ok(data.len())
    }

    fn read_bytes(&mut self, length: usize, timeout: Duration) -> Result<Vec<u8>> {
        let port = self.port_mut()?;
        let start = Instant::now();
        let mut buffer = vec![0u8; length];
        let mut received = 0;

        while received < length {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(ConnectionError::TransportTimeout {
                    operation: "read".to_string(),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    expected: length,
                    received,
                }
                .into());
            }
            port.set_timeout(remaining)
                .map_err(|e| ConnectionError::SerialError {
                    reason: e.to_string(),
                })?;

            match port.read(&mut buffer[received..]) {
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::trace!("RX {:02x?}", buffer);
        Ok(buffer)
    }
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("params", &self.params)
            .field("open", &self.is_open())
            .finish()
    }
}
