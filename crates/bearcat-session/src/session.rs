//! Programming-mode session state machine
//!
//! ```text
//!   Idle --PRG,OK--> ProgrammingMode --EPG--> Idle --close--> Closed
//! ```
//!
//! Channel and identity reads are only issued inside the programming-mode
//! bracket. Once any exchange fails the session is faulted: every later
//! command except `EPG` is refused without touching the wire, so the only
//! remaining traffic is the attempt to take the scanner out of programming
//! mode.

use bearcat_protocol::{ChannelIndex, ChannelRecord, ProtocolError, Reply, ScannerCommand};
use tracing::{debug, info, warn};

use crate::codec::CommandCodec;
use crate::error::SessionError;
use crate::transport::Transport;

/// Where a session is in the programming-mode bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Connected, not in programming mode
    Idle,
    /// `PRG` acknowledged
    ProgrammingMode,
    /// Transport released
    Closed,
}

/// A connection to one scanner
pub struct Session<T> {
    codec: CommandCodec<T>,
    state: SessionState,
    faulted: bool,
}

impl<T: Transport> Session<T> {
    /// Start an idle session that owns `transport`
    pub fn new(transport: T) -> Self {
        Self {
            codec: CommandCodec::new(transport),
            state: SessionState::Idle,
            faulted: false,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once any exchange has failed
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        self.codec.transport()
    }

    /// Enter programming mode (`PRG`)
    pub async fn enter_programming(&mut self) -> Result<(), SessionError> {
        let command = ScannerCommand::EnterProgram;
        self.check(command, SessionState::Idle)?;

        self.exchange(command).await?;
        self.state = SessionState::ProgrammingMode;
        info!("Entered programming mode");
        Ok(())
    }

    /// Leave programming mode (`EPG`)
    ///
    /// Best-effort: the session returns to Idle whatever the reply. Also
    /// allowed from a faulted Idle session, since a failed `PRG` may still
    /// have switched the scanner into programming mode.
    pub async fn exit_programming(&mut self) -> Result<(), SessionError> {
        let command = ScannerCommand::ExitProgram;
        match self.state {
            SessionState::Closed => return Err(SessionError::Closed),
            SessionState::Idle if !self.faulted => {
                return Err(SessionError::InvalidState {
                    command: command.to_line(),
                    state: self.state,
                })
            }
            _ => {}
        }

        let result = self.exchange(command).await;
        self.state = SessionState::Idle;
        result?;
        info!("Exited programming mode");
        Ok(())
    }

    /// Read the model name (`MDL`)
    pub async fn read_model(&mut self) -> Result<String, SessionError> {
        match self.business(ScannerCommand::GetModel).await? {
            Reply::Model(model) => Ok(model),
            other => Err(unexpected(other)),
        }
    }

    /// Read the firmware version (`VER`)
    pub async fn read_version(&mut self) -> Result<String, SessionError> {
        match self.business(ScannerCommand::GetVersion).await? {
            Reply::Version(version) => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    /// Read one channel memory (`CIN,n`)
    pub async fn read_channel(
        &mut self,
        index: ChannelIndex,
    ) -> Result<ChannelRecord, SessionError> {
        match self.business(ScannerCommand::GetChannel(index)).await? {
            Reply::Channel(record) => {
                if record.index != index.get() {
                    debug!("CIN,{} answered for index {}", index.get(), record.index);
                }
                Ok(record)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Close the transport; later calls are no-ops
    pub async fn close(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        if self.state == SessionState::ProgrammingMode {
            warn!("Closing while the scanner is still in programming mode");
        }
        self.codec.transport_mut().close().await;
        self.state = SessionState::Closed;
        Ok(())
    }

    async fn business(&mut self, command: ScannerCommand) -> Result<Reply, SessionError> {
        self.check(command, SessionState::ProgrammingMode)?;
        self.exchange(command).await
    }

    fn check(&self, command: ScannerCommand, required: SessionState) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        if self.faulted {
            return Err(SessionError::Aborted {
                command: command.to_line(),
            });
        }
        if self.state != required {
            return Err(SessionError::InvalidState {
                command: command.to_line(),
                state: self.state,
            });
        }
        Ok(())
    }

    async fn exchange(&mut self, command: ScannerCommand) -> Result<Reply, SessionError> {
        let result = self.codec.execute(command).await;
        if result.is_err() {
            self.faulted = true;
        }
        result
    }
}

fn unexpected(reply: Reply) -> SessionError {
    ProtocolError::BadAnswer(reply.to_line()).into()
}

#[cfg(test)]
mod tests {
    use bearcat_protocol::Modulation;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    use super::*;
    use crate::transport::LineTransport;

    /// Answer each received command with the next scripted reply
    fn spawn_peer(
        peer: DuplexStream,
        replies: &'static [&'static str],
    ) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(peer);
            let mut reader = BufReader::new(read);
            let mut received = Vec::new();
            for reply in replies {
                let mut line = Vec::new();
                if reader.read_until(b'\r', &mut line).await.unwrap_or(0) == 0 {
                    break;
                }
                line.pop();
                received.push(String::from_utf8(line).unwrap());
                write.write_all(format!("{}\r", reply).as_bytes()).await.unwrap();
            }
            received
        })
    }

    fn session(client: DuplexStream) -> Session<LineTransport<DuplexStream>> {
        Session::new(LineTransport::new("test", client))
    }

    #[tokio::test]
    async fn test_programming_bracket() {
        let (client, peer) = tokio::io::duplex(256);
        let peer = spawn_peer(peer, &["PRG,OK", "CIN,7,,01462500,FM,,0,1,0", "EPG,OK"]);
        let mut session = session(client);

        session.enter_programming().await.unwrap();
        assert_eq!(session.state(), SessionState::ProgrammingMode);

        let record = session.read_channel(ChannelIndex::new(7).unwrap()).await.unwrap();
        assert_eq!(record.modulation, Modulation::Fm);
        assert!(record.lockout);

        session.exit_programming().await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        session.close().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.transport().is_open());

        assert_eq!(peer.await.unwrap(), vec!["PRG", "CIN,7", "EPG"]);
    }

    #[tokio::test]
    async fn test_reads_require_programming_mode() {
        let (client, _peer) = tokio::io::duplex(64);
        let mut session = session(client);

        let err = session.read_model().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState { state: SessionState::Idle, .. }
        ));
        assert!(matches!(
            session.exit_programming().await,
            Err(SessionError::InvalidState { .. })
        ));
        assert!(!session.is_faulted());
    }

    #[tokio::test]
    async fn test_failure_only_allows_exit() {
        let (client, peer) = tokio::io::duplex(256);
        let peer = spawn_peer(peer, &["PRG,OK", "MDL", "EPG,OK"]);
        let mut session = session(client);

        session.enter_programming().await.unwrap();
        assert!(session.read_model().await.is_err());
        assert!(session.is_faulted());

        assert!(matches!(
            session.read_version().await,
            Err(SessionError::Aborted { command }) if command == "VER"
        ));

        session.exit_programming().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(peer.await.unwrap(), vec!["PRG", "MDL", "EPG"]);
    }

    #[tokio::test]
    async fn test_failed_enter_still_exits() {
        let (client, peer) = tokio::io::duplex(256);
        let peer = spawn_peer(peer, &["PRG,NG", "EPG,OK"]);
        let mut session = session(client);

        assert!(session.enter_programming().await.is_err());
        assert_eq!(session.state(), SessionState::Idle);

        session.exit_programming().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(peer.await.unwrap(), vec!["PRG", "EPG"]);
    }

    #[tokio::test]
    async fn test_exit_returns_to_idle_on_rejection() {
        let (client, peer) = tokio::io::duplex(256);
        let _peer = spawn_peer(peer, &["PRG,OK", "EPG,NG"]);
        let mut session = session(client);

        session.enter_programming().await.unwrap();
        assert!(session.exit_programming().await.is_err());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_terminal() {
        let (client, _peer) = tokio::io::duplex(64);
        let mut session = session(client);

        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(matches!(
            session.enter_programming().await,
            Err(SessionError::Closed)
        ));
    }
}
