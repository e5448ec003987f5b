//! Command-line arguments

use bearcat_session::Dump;
use clap::Parser;
use thiserror::Error;

use crate::settings::Settings;

/// Dump identity and channel memories from a Uniden scanner.
#[derive(Debug, Parser)]
#[command(name = "bearcat", version, about)]
pub struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM3).
    /// May be omitted when settings.json names a default port.
    pub port: Option<String>,

    /// Dumps to run, in order: `vermdl` (model and firmware version),
    /// `freq` (programmed channel memories).
    pub commands: Vec<String>,

    /// Override the baud rate (default 57600).
    #[arg(long)]
    pub baud: Option<u32>,

    /// List the available serial ports and exit.
    #[arg(long)]
    pub list_ports: bool,

    /// Talk to a built-in virtual scanner instead of a serial port.
    #[arg(long)]
    pub simulate: bool,
}

/// Where the dumps are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A serial port
    Port(String),
    /// The in-process virtual scanner
    Simulated,
}

/// Fully resolved run request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Target,
    pub baud_rate: u32,
    pub dumps: Vec<Dump>,
}

/// Arguments that cannot form a run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no port given")]
    MissingPort,
    #[error("no command given")]
    MissingCommand,
    #[error("{0}")]
    WrongCommand(String),
}

impl Cli {
    /// Resolve arguments against saved settings
    ///
    /// A first positional that names a dump is taken as a command, so a
    /// default port from settings (or `--simulate`) can stand in for it.
    pub fn invocation(&self, settings: &Settings) -> Result<Invocation, UsageError> {
        let mut words: Vec<&str> = self
            .port
            .iter()
            .chain(&self.commands)
            .map(String::as_str)
            .collect();

        let leading_port = words
            .first()
            .is_some_and(|first| first.parse::<Dump>().is_err());
        let port = if leading_port {
            Some(words.remove(0).to_string())
        } else {
            settings.port.clone()
        };

        let target = if self.simulate {
            Target::Simulated
        } else {
            Target::Port(port.ok_or(UsageError::MissingPort)?)
        };

        if words.is_empty() {
            return Err(UsageError::MissingCommand);
        }
        let dumps = words
            .into_iter()
            .map(str::parse::<Dump>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(UsageError::WrongCommand)?;

        Ok(Invocation {
            target,
            baud_rate: self.baud.unwrap_or(settings.baud_rate),
            dumps,
        })
    }
}
