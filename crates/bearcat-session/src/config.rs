//! Connection settings

use bearcat_protocol::BAUD_RATE;
use tokio_serial::SerialStream;

use crate::error::SessionError;
use crate::transport::LineTransport;

/// Where and how to reach the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Serial port path (e.g., /dev/ttyACM0, COM3)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl SessionConfig {
    /// Configuration for `port` at the scanner's native baud rate
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BAUD_RATE,
        }
    }

    /// Override the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Open the configured serial port
    pub fn open(&self) -> Result<LineTransport<SerialStream>, SessionError> {
        LineTransport::open(&self.port, self.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baud_rate() {
        let config = SessionConfig::new("/dev/ttyACM0");
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.with_baud_rate(115_200).baud_rate, 115_200);
    }
}
