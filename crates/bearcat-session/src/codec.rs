//! Single-exchange command codec
//!
//! The protocol carries no sequence numbers, so a reply can only be matched
//! to a command by order. [`CommandCodec`] therefore allows exactly one
//! command in flight: it writes the command, waits for one line, and parses
//! that line against the grammar of the command it just sent.

use bearcat_protocol::{parse_reply, Reply, ScannerCommand};
use tracing::trace;

use crate::error::SessionError;
use crate::transport::Transport;

/// Command/reply exchanger owning the transport
pub struct CommandCodec<T> {
    transport: T,
    /// Command whose reply has not been consumed yet
    pending: Option<ScannerCommand>,
}

impl<T: Transport> CommandCodec<T> {
    /// Create a codec over `transport`
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: None,
        }
    }

    /// Send `command` and parse the single reply line it produces
    ///
    /// If an earlier call was dropped while waiting, its reply may still
    /// arrive and would be mistaken for this one, so the call is refused.
    pub async fn execute(&mut self, command: ScannerCommand) -> Result<Reply, SessionError> {
        if let Some(stale) = self.pending {
            return Err(SessionError::PendingReply(stale.to_line()));
        }

        self.transport.write_line(&command.to_line()).await?;
        self.pending = Some(command);

        let line = self.transport.read_line().await;
        self.pending = None;
        let line = line?;

        trace!("{} answered {:?}", command, line);
        Ok(parse_reply(command.verb(), &line)?)
    }

    /// Command currently awaiting its reply
    pub fn pending(&self) -> Option<ScannerCommand> {
        self.pending
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
