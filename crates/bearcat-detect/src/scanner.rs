//! Serial port scanner
//!
//! This module provides serial port enumeration.

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;

/// USB vendor ID assigned to Uniden
pub const UNIDEN_VID: u16 = 0x1965;

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyACM0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB product string
    pub product: Option<String>,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                product: None,
            },
        }
    }

    /// True if the USB vendor is Uniden
    pub fn is_uniden(&self) -> bool {
        self.vid == Some(UNIDEN_VID)
    }

    /// One-line description for listings
    pub fn describe(&self) -> String {
        match (&self.product, self.vid, self.pid) {
            (Some(product), _, _) => format!("{} ({})", self.port, product),
            (None, Some(vid), Some(pid)) => format!("{} ({:04x}:{:04x})", self.port, vid, pid),
            _ => self.port.clone(),
        }
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports matching these patterns
    pub skip_patterns: Vec<String>,
}

/// Serial port scanner
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig {
                skip_patterns: vec![
                    // Bluetooth ports on macOS
                    "Bluetooth".to_string(),
                    // Debug/logging ports
                    "debug".to_string(),
                ],
            },
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate all available serial ports, Uniden devices first
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        info!("Enumerating serial ports...");
        let ports = available_ports()?;

        let result = self.filter_ports(
            ports
                .into_iter()
                .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type)),
        );

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                info!("  {}", port.describe());
            }
        }

        Ok(result)
    }

    fn filter_ports(&self, ports: impl Iterator<Item = SerialPortInfo>) -> Vec<SerialPortInfo> {
        let mut result: Vec<_> = ports.filter(|p| !self.should_skip_port(p)).collect();
        // Stable sort keeps OS order within each group
        result.sort_by_key(|p| !p.is_uniden());
        result
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &SerialPortInfo) -> bool {
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| port.port.contains(pattern.as_str()))
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of the available serial ports
pub fn list_ports() -> Result<Vec<String>, DetectError> {
    Ok(PortScanner::new()
        .enumerate_ports()?
        .into_iter()
        .map(|p| p.port)
        .collect())
}
