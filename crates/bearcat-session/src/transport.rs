//! Line-oriented transport over a serial port or any async byte stream
//!
//! The scanner terminates every line with `\r`. [`LineTransport`] buffers
//! incoming bytes and hands back one line per [`Transport::read_line`] call
//! with the terminator stripped.

use std::io::{self, ErrorKind};

use bearcat_protocol::TERMINATOR;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::error::SessionError;

/// Longest line accepted before the terminator is seen
const MAX_LINE_LEN: usize = 256;

/// Duplex line transport used by a session
///
/// Implementations must deliver lines in the order they were received and
/// must make [`close`](Transport::close) idempotent.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Write one line, appending the terminator
    async fn write_line(&mut self, line: &str) -> Result<(), SessionError>;

    /// Wait for the next complete line, terminator stripped
    async fn read_line(&mut self) -> Result<String, SessionError>;

    /// Release the underlying connection
    async fn close(&mut self);

    /// True until [`close`](Transport::close) has been called
    fn is_open(&self) -> bool;
}

/// [`Transport`] over an `AsyncRead + AsyncWrite` stream
///
/// Generic over the I/O type to support both real serial ports and virtual
/// scanners. For virtual scanners, use `DuplexStream` from `tokio::io::duplex()`.
pub struct LineTransport<T> {
    name: String,
    io: Option<T>,
    pending: Vec<u8>,
    buffer: Vec<u8>,
}

impl LineTransport<SerialStream> {
    /// Open a serial port
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, SessionError> {
        let stream = tokio_serial::new(port_name, baud_rate)
            .open_native_async()
            .map_err(|e| SessionError::Connection {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        info!("Port {} opened at {} baud", port_name, baud_rate);
        Ok(Self::new(port_name, stream))
    }
}

impl<T> LineTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-open stream
    pub fn new(name: impl Into<String>, io: T) -> Self {
        Self {
            name: name.into(),
            io: Some(io),
            pending: Vec::with_capacity(MAX_LINE_LEN),
            buffer: vec![0u8; 1024],
        }
    }

    /// Extract one complete line from the receive buffer
    ///
    /// Lines longer than [`MAX_LINE_LEN`] are discarded with an error,
    /// whether or not their terminator has arrived yet.
    fn take_line(&mut self) -> Result<Option<String>, SessionError> {
        let Some(term_pos) = self.pending.iter().position(|&b| b == TERMINATOR) else {
            if self.pending.len() > MAX_LINE_LEN {
                self.pending.clear();
                return Err(overlong_line());
            }
            return Ok(None);
        };

        let line: Vec<u8> = self.pending.drain(..=term_pos).collect();
        if term_pos > MAX_LINE_LEN {
            return Err(overlong_line());
        }
        Ok(Some(String::from_utf8_lossy(&line[..term_pos]).into_owned()))
    }
}

fn overlong_line() -> SessionError {
    io::Error::new(
        ErrorKind::InvalidData,
        format!("no line terminator within {} bytes", MAX_LINE_LEN),
    )
    .into()
}

impl<T> Transport for LineTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn write_line(&mut self, line: &str) -> Result<(), SessionError> {
        let io = self.io.as_mut().ok_or(SessionError::Closed)?;

        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(TERMINATOR);

        debug!(">> {}: {:?}", self.name, line);
        io.write_all(&data).await?;
        io.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, SessionError> {
        loop {
            if let Some(line) = self.take_line()? {
                debug!("<< {}: {:?}", self.name, line);
                return Ok(line);
            }

            let io = self.io.as_mut().ok_or(SessionError::Closed)?;
            match io.read(&mut self.buffer).await {
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("{} closed by peer", self.name),
                    )
                    .into());
                }
                Ok(n) => self.pending.extend_from_slice(&self.buffer[..n]),
                // Serial drivers may surface idle reads as these
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut io) = self.io.take() {
            if let Err(e) = io.shutdown().await {
                warn!("Error shutting down {}: {}", self.name, e);
            }
            self.pending.clear();
            info!("Port {} closed", self.name);
        }
    }

    fn is_open(&self) -> bool {
        self.io.is_some()
    }
}
