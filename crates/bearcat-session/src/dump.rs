//! Memory dumps built on the task queue

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use bearcat_protocol::ChannelIndex;
use tracing::info;

use crate::error::SessionError;
use crate::queue::{Operation, TaskQueue};
use crate::session::Session;
use crate::transport::Transport;

/// A dump that can be requested for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dump {
    /// `# Model: ...` and `# Version: ...`
    VersionModel,
    /// Every programmed channel, grouped by bank
    Frequencies,
}

impl Dump {
    /// Business operations contributed by this dump
    pub fn operations(&self) -> Vec<Operation> {
        match self {
            Dump::VersionModel => vec![Operation::ReportModel, Operation::ReportVersion],
            Dump::Frequencies => ChannelIndex::all().map(Operation::ReportChannel).collect(),
        }
    }

    /// Command-line name
    pub fn name(&self) -> &'static str {
        match self {
            Dump::VersionModel => "vermdl",
            Dump::Frequencies => "freq",
        }
    }
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dump {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vermdl" => Ok(Dump::VersionModel),
            "freq" => Ok(Dump::Frequencies),
            other => Err(format!("wrong command: {}", other)),
        }
    }
}

/// Run the given dumps over `transport`, writing dump lines to `out`
///
/// The transport is closed before this returns, on success and failure.
pub async fn run_dumps<T, W>(
    transport: T,
    dumps: &[Dump],
    out: &mut W,
) -> Result<(), SessionError>
where
    T: Transport,
    W: Write,
{
    let queue = TaskQueue::for_dumps(dumps);
    info!("Running {} operation(s)", queue.len());

    let mut session = Session::new(transport);
    queue.run(&mut session, out).await
}

/// Print model and firmware version
pub async fn run_version_model_dump<T, W>(transport: T, out: &mut W) -> Result<(), SessionError>
where
    T: Transport,
    W: Write,
{
    run_dumps(transport, &[Dump::VersionModel], out).await
}

/// Print every programmed channel memory
pub async fn run_frequency_dump<T, W>(transport: T, out: &mut W) -> Result<(), SessionError>
where
    T: Transport,
    W: Write,
{
    run_dumps(transport, &[Dump::Frequencies], out).await
}
