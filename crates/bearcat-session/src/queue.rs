//! Sequential task queue
//!
//! A run is described up front as a FIFO of [`Operation`]s: `PRG` first, the
//! business reads of each requested dump, then `EPG` and close. The queue is
//! drained strictly in order, one exchange at a time. After the first
//! failure the remaining business operations are skipped but the teardown
//! operations still run, so the scanner is never left in programming mode
//! and the port is always released.

use std::collections::VecDeque;
use std::io::Write;

use bearcat_protocol::ChannelIndex;
use tracing::{debug, error, warn};

use crate::dump::Dump;
use crate::error::SessionError;
use crate::session::Session;
use crate::transport::Transport;

/// One queued step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Send `PRG`
    EnterProgramming,
    /// Read the model and print `# Model: ...`
    ReportModel,
    /// Read the version and print `# Version: ...`
    ReportVersion,
    /// Read one channel and print it if programmed
    ReportChannel(ChannelIndex),
    /// Send `EPG`
    ExitProgramming,
    /// Release the transport
    Close,
}

impl Operation {
    /// Teardown operations run even after an earlier failure
    pub fn is_teardown(&self) -> bool {
        matches!(self, Operation::ExitProgramming | Operation::Close)
    }

    async fn perform<T, W>(self, session: &mut Session<T>, out: &mut W) -> Result<(), SessionError>
    where
        T: Transport,
        W: Write,
    {
        match self {
            Operation::EnterProgramming => session.enter_programming().await,
            Operation::ReportModel => {
                let model = session.read_model().await?;
                writeln!(out, "# Model: {}", model)?;
                Ok(())
            }
            Operation::ReportVersion => {
                let version = session.read_version().await?;
                writeln!(out, "# Version: {}", version)?;
                Ok(())
            }
            Operation::ReportChannel(index) => {
                if index.starts_bank() {
                    writeln!(out, "#\n# Bank {}\n#", index.bank())?;
                }
                let record = session.read_channel(index).await?;
                if !record.is_unused() {
                    writeln!(out, "{}", record.dump_line(index))?;
                }
                Ok(())
            }
            Operation::ExitProgramming => session.exit_programming().await,
            Operation::Close => session.close().await,
        }
    }
}

/// Ordered, single-use queue of operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQueue {
    operations: VecDeque<Operation>,
}

impl TaskQueue {
    /// Build the queue for the given dumps, in the order given
    pub fn for_dumps(dumps: &[Dump]) -> Self {
        let mut operations = VecDeque::new();
        operations.push_back(Operation::EnterProgramming);
        for dump in dumps {
            operations.extend(dump.operations());
        }
        operations.push_back(Operation::ExitProgramming);
        operations.push_back(Operation::Close);
        Self { operations }
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Queued operations in execution order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Drain the queue against `session`, writing dump lines to `out`
    ///
    /// Returns the first error encountered. Errors from teardown after an
    /// earlier failure are logged only.
    pub async fn run<T, W>(
        mut self,
        session: &mut Session<T>,
        out: &mut W,
    ) -> Result<(), SessionError>
    where
        T: Transport,
        W: Write,
    {
        let mut first_error: Option<SessionError> = None;
        let mut skipped = 0usize;

        while let Some(operation) = self.operations.pop_front() {
            if first_error.is_some() && !operation.is_teardown() {
                skipped += 1;
                continue;
            }

            debug!("Running {:?}", operation);
            let result = operation.perform(session, out).await;
            if let Err(e) = out.flush() {
                warn!("Failed to flush output: {}", e);
            }

            if let Err(e) = result {
                error!("{:?} failed: {}", operation, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} operation(s) after failure", skipped);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
