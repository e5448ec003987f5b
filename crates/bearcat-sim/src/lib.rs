//! Scanner Simulation Library
//!
//! This crate provides a simulated scanner for exercising sessions without
//! hardware. It includes:
//!
//! - **VirtualScanner**: answers protocol lines the way a BC125AT does
//! - **run_virtual_scanner_task**: serves a `VirtualScanner` over an async stream
//!
//! # Example
//!
//! ```rust
//! use bearcat_protocol::{ChannelIndex, Modulation, RawFrequency};
//! use bearcat_sim::VirtualScanner;
//!
//! let mut scanner = VirtualScanner::new();
//! scanner.program(
//!     ChannelIndex::new(2).unwrap(),
//!     RawFrequency::parse("04625625").unwrap(),
//!     Modulation::Fm,
//! );
//!
//! assert_eq!(scanner.respond("CIN,2"), "NG");
//! assert_eq!(scanner.respond("PRG"), "PRG,OK");
//! assert_eq!(scanner.respond("CIN,2"), "CIN,2,,04625625,FM,,0,0,0");
//! ```

pub mod scanner;
pub mod scanner_task;

pub use scanner::{VirtualScanner, VirtualScannerConfig};
pub use scanner_task::{run_virtual_scanner_task, spawn_virtual_scanner};
