//! Outgoing scanner commands
//!
//! # Common Commands
//! - `VER` - Firmware version
//! - `MDL` - Model name
//! - `PRG` - Enter programming mode
//! - `EPG` - Exit programming mode
//! - `CIN,n` - Read channel memory `n`

use std::fmt;
use std::str::FromStr;

use crate::channel::ChannelIndex;
use crate::error::ParseError;
use crate::EncodeCommand;

/// Command verb, shared by a command and its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Ver,
    Mdl,
    Prg,
    Epg,
    Cin,
}

impl Verb {
    /// The three-letter wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Ver => "VER",
            Verb::Mdl => "MDL",
            Verb::Prg => "PRG",
            Verb::Epg => "EPG",
            Verb::Cin => "CIN",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VER" => Ok(Verb::Ver),
            "MDL" => Ok(Verb::Mdl),
            "PRG" => Ok(Verb::Prg),
            "EPG" => Ok(Verb::Epg),
            "CIN" => Ok(Verb::Cin),
            _ => Err(ParseError::UnknownCommand(s.to_string())),
        }
    }
}

/// A command sent to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerCommand {
    /// Firmware version query: VER
    GetVersion,
    /// Model query: MDL
    GetModel,
    /// Enter programming mode: PRG
    EnterProgram,
    /// Exit programming mode: EPG
    ExitProgram,
    /// Channel memory query: CIN,42
    GetChannel(ChannelIndex),
}

impl ScannerCommand {
    /// The verb this command is sent with and answered by
    pub fn verb(&self) -> Verb {
        match self {
            ScannerCommand::GetVersion => Verb::Ver,
            ScannerCommand::GetModel => Verb::Mdl,
            ScannerCommand::EnterProgram => Verb::Prg,
            ScannerCommand::ExitProgram => Verb::Epg,
            ScannerCommand::GetChannel(_) => Verb::Cin,
        }
    }

    /// The command line without terminator
    pub fn to_line(&self) -> String {
        match self {
            ScannerCommand::GetChannel(index) => format!("{},{}", Verb::Cin, index.get()),
            other => other.verb().as_str().to_string(),
        }
    }

    /// Parse a command line (terminator already stripped)
    ///
    /// Channel writes (`CIN` with more than one argument) are rejected.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut fields = line.split(',');
        let verb: Verb = fields.next().unwrap_or_default().parse()?;
        let args: Vec<&str> = fields.collect();

        match (verb, args.as_slice()) {
            (Verb::Ver, []) => Ok(ScannerCommand::GetVersion),
            (Verb::Mdl, []) => Ok(ScannerCommand::GetModel),
            (Verb::Prg, []) => Ok(ScannerCommand::EnterProgram),
            (Verb::Epg, []) => Ok(ScannerCommand::ExitProgram),
            (Verb::Cin, [index]) => Ok(ScannerCommand::GetChannel(index.parse()?)),
            _ => Err(ParseError::InvalidFrame(line.to_string())),
        }
    }
}

impl fmt::Display for ScannerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl EncodeCommand for ScannerCommand {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.to_line().into_bytes();
        bytes.push(crate::TERMINATOR);
        bytes
    }
}
