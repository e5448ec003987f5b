//! Uniden Scanner Protocol Library
//!
//! This crate provides encoding and parsing for the line-oriented ASCII
//! protocol spoken by Uniden handheld scanners (BC125AT class) over their
//! USB serial port.
//!
//! # Format
//! - Commands: `VERB[,arg...]\r`
//! - Replies: `VERB,field...` terminated by `\r`
//! - Exactly one reply per command, no correlation IDs
//!
//! # Architecture
//!
//! - [`command`]: outgoing commands and their wire encoding
//! - [`reply`]: fixed-grammar parsers for each reply kind
//! - [`channel`]: channel records, bank/channel indexing, frequency display
//!
//! # Example
//!
//! ```rust
//! use bearcat_protocol::{parse_reply, EncodeCommand, Reply, ScannerCommand};
//!
//! assert_eq!(ScannerCommand::GetModel.encode(), b"MDL\r");
//!
//! let reply = parse_reply(ScannerCommand::GetModel.verb(), "MDL,BC125AT").unwrap();
//! assert_eq!(reply, Reply::Model("BC125AT".to_string()));
//! ```

pub mod channel;
pub mod command;
pub mod error;
pub mod reply;

pub use channel::{
    bank_of, channel_of, format_frequency, ChannelIndex, ChannelRecord, Modulation, RawFrequency,
    BANK_COUNT, CHANNELS_PER_BANK, CHANNEL_COUNT,
};
pub use command::{ScannerCommand, Verb};
pub use error::{ParseError, ProtocolError};
pub use reply::{parse_reply, Reply};

/// Baud rate used by the scanner's USB serial interface
pub const BAUD_RATE: u32 = 57_600;

/// Line terminator for both directions
pub const TERMINATOR: u8 = b'\r';

/// Trait for messages that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this message to its wire format, terminator included
    fn encode(&self) -> Vec<u8>;
}
