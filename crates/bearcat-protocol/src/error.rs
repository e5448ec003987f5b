//! Error types for scanner protocol parsing

use thiserror::Error;

use crate::command::Verb;

/// Errors that can occur while parsing an incoming command line
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown or unsupported command verb
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid line structure
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Channel index outside 1..=300
    #[error("invalid channel index: {0}")]
    InvalidIndex(String),
}

/// Errors raised when a reply does not satisfy its grammar
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A VER/MDL/CIN reply did not match the expected grammar
    #[error("bad answer: {0:?}")]
    BadAnswer(String),

    /// A PRG/EPG reply was something other than `OK`
    #[error("{verb} error: {line:?}")]
    ModeRejected {
        /// The mode command that was rejected
        verb: Verb,
        /// The raw reply line
        line: String,
    },
}
