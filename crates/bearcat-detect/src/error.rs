//! Error types for port discovery

use thiserror::Error;

/// Errors that can occur during discovery
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),
}

impl From<serialport::Error> for DetectError {
    fn from(e: serialport::Error) -> Self {
        DetectError::EnumerationFailed(e.to_string())
    }
}
