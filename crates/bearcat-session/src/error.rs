//! Error types for scanner sessions

use bearcat_protocol::ProtocolError;
use thiserror::Error;

use crate::session::SessionState;

/// Errors that can occur while talking to the scanner
#[derive(Debug, Error)]
pub enum SessionError {
    /// The serial port could not be opened
    #[error("failed to open port {port}: {reason}")]
    Connection { port: String, reason: String },

    /// Read or write failure on an open transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reply did not match the expected grammar
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Command issued in a state that does not allow it
    #[error("{command} not allowed in {state:?} state")]
    InvalidState {
        command: String,
        state: SessionState,
    },

    /// Command refused because an earlier command failed
    #[error("{command} not sent: session aborted after an earlier failure")]
    Aborted { command: String },

    /// An earlier exchange was abandoned before its reply arrived
    #[error("{0} is still awaiting its reply")]
    PendingReply(String),

    /// The transport has been closed
    #[error("transport is closed")]
    Closed,
}

/// Coarse classification of [`SessionError`], one per process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cannot open or enumerate the transport
    Connection,
    /// Read/write failure on an open transport
    Io,
    /// Reply failed its grammar ("bad answer")
    Protocol,
    /// PRG/EPG answered with something other than OK
    Mode,
    /// Command ordering violated
    Sequence,
}

impl SessionError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Connection { .. } => ErrorKind::Connection,
            SessionError::Io(_) | SessionError::Closed => ErrorKind::Io,
            SessionError::Protocol(ProtocolError::BadAnswer(_)) => ErrorKind::Protocol,
            SessionError::Protocol(ProtocolError::ModeRejected { .. }) => ErrorKind::Mode,
            SessionError::InvalidState { .. }
            | SessionError::Aborted { .. }
            | SessionError::PendingReply(_) => ErrorKind::Sequence,
        }
    }
}
