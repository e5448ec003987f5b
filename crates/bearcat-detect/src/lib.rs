//! Serial Port Discovery Library
//!
//! This crate enumerates the serial ports a scanner may be attached to, so a
//! caller that was not given a device path can show the user what exists.
//! There is no protocol probing: the scanner protocol has no side-effect-free
//! identification exchange outside programming mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use bearcat_detect::PortScanner;
//!
//! let scanner = PortScanner::new();
//! for port in scanner.enumerate_ports().unwrap() {
//!     println!("Found port: {}", port.port);
//! }
//! ```

pub mod error;
pub mod scanner;

pub use error::DetectError;
pub use scanner::{list_ports, PortScanner, ScannerConfig, SerialPortInfo};
