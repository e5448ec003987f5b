//! Virtual scanner simulation
//!
//! Provides a simulated scanner that answers protocol lines the way the
//! real handheld does, including the programming-mode requirement for
//! channel reads.

use std::collections::HashMap;

use bearcat_protocol::{
    ChannelIndex, ChannelRecord, Modulation, RawFrequency, Reply, ScannerCommand, Verb,
    CHANNEL_COUNT,
};
use tracing::debug;

/// Reply to a line the scanner cannot parse
const ERROR_REPLY: &str = "ERR";

/// Reply to a valid command issued in the wrong mode
const REFUSED_REPLY: &str = "NG";

/// A simulated scanner
#[derive(Debug)]
pub struct VirtualScanner {
    /// Model name reported by MDL
    model: String,
    /// Firmware version reported by VER
    version: String,
    /// Channel memories, index 1 at position 0
    channels: Vec<ChannelRecord>,
    /// Programming mode active
    programming: bool,
    /// One-shot replies keyed by command line
    scripted: HashMap<String, String>,
    /// Every line received, in order
    command_log: Vec<String>,
}

/// Configuration for creating a virtual scanner
#[derive(Debug, Clone)]
pub struct VirtualScannerConfig {
    /// Model name
    pub model: String,
    /// Firmware version text
    pub version: String,
}

impl Default for VirtualScannerConfig {
    fn default() -> Self {
        Self {
            model: "BC125AT".to_string(),
            version: "Version 1.06.06".to_string(),
        }
    }
}

impl VirtualScanner {
    /// Create a BC125AT with every channel empty
    pub fn new() -> Self {
        Self::from_config(VirtualScannerConfig::default())
    }

    /// Create a virtual scanner from configuration
    pub fn from_config(config: VirtualScannerConfig) -> Self {
        Self {
            model: config.model,
            version: config.version,
            channels: (1..=CHANNEL_COUNT).map(ChannelRecord::unused).collect(),
            programming: false,
            scripted: HashMap::new(),
            command_log: Vec::new(),
        }
    }

    /// A scanner with a handful of typical channels programmed
    pub fn with_demo_channels() -> Self {
        let mut scanner = Self::new();
        let demo = [
            (1, "01624000", Modulation::Fm),
            (2, "01624250", Modulation::Fm),
            (3, "01625500", Modulation::Fm),
            (31, "04625625", Modulation::Fm),
            (32, "04625875", Modulation::Fm),
            (61, "01183000", Modulation::Am),
            (62, "01215000", Modulation::Am),
            (91, "01568000", Modulation::Fm),
        ];
        for (index, frequency, modulation) in demo {
            if let (Some(index), Some(frequency)) =
                (ChannelIndex::new(index), RawFrequency::parse(frequency))
            {
                scanner.program(index, frequency, modulation);
            }
        }
        if let Some(airband) = ChannelIndex::new(61) {
            scanner.channel_mut(airband).delay = true;
        }
        if let Some(guard) = ChannelIndex::new(62) {
            scanner.channel_mut(guard).priority = true;
        }
        scanner
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Firmware version text
    pub fn version(&self) -> &str {
        &self.version
    }

    /// True while in programming mode
    pub fn in_programming_mode(&self) -> bool {
        self.programming
    }

    /// Store a frequency in a channel slot, returning the record for
    /// further edits
    pub fn program(
        &mut self,
        index: ChannelIndex,
        frequency: RawFrequency,
        modulation: Modulation,
    ) -> &mut ChannelRecord {
        let record = self.channel_mut(index);
        *record = ChannelRecord {
            index: index.get(),
            frequency,
            modulation,
            delay: false,
            lockout: false,
            priority: false,
        };
        record
    }

    /// Read a channel slot
    pub fn channel(&self, index: ChannelIndex) -> &ChannelRecord {
        &self.channels[usize::from(index.get() - 1)]
    }

    /// Mutably borrow a channel slot
    pub fn channel_mut(&mut self, index: ChannelIndex) -> &mut ChannelRecord {
        &mut self.channels[usize::from(index.get() - 1)]
    }

    /// Answer the next occurrence of `command` with `reply` instead of the
    /// normal response
    pub fn script_reply(&mut self, command: impl Into<String>, reply: impl Into<String>) {
        self.scripted.insert(command.into(), reply.into());
    }

    /// Every line received so far
    pub fn command_log(&self) -> &[String] {
        &self.command_log
    }

    /// Produce the reply line for one received line (terminator stripped)
    pub fn respond(&mut self, line: &str) -> String {
        self.command_log.push(line.to_string());

        let reply = match self.scripted.remove(line) {
            Some(reply) => reply,
            None => self.execute(line),
        };
        debug!("Virtual scanner {:?} -> {:?}", line, reply);
        reply
    }

    fn execute(&mut self, line: &str) -> String {
        let command = match ScannerCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Virtual scanner rejected {:?}: {}", line, e);
                return ERROR_REPLY.to_string();
            }
        };

        match command {
            ScannerCommand::GetModel => Reply::Model(self.model.clone()).to_line(),
            ScannerCommand::GetVersion => Reply::Version(self.version.clone()).to_line(),
            ScannerCommand::EnterProgram => {
                self.programming = true;
                Reply::ModeAck(Verb::Prg).to_line()
            }
            ScannerCommand::ExitProgram if self.programming => {
                self.programming = false;
                Reply::ModeAck(Verb::Epg).to_line()
            }
            ScannerCommand::GetChannel(index) if self.programming => {
                Reply::Channel(self.channel(index).clone()).to_line()
            }
            ScannerCommand::ExitProgram | ScannerCommand::GetChannel(_) => {
                REFUSED_REPLY.to_string()
            }
        }
    }
}

impl Default for VirtualScanner {
    fn default() -> Self {
        Self::new()
    }
}
