//! Channel memory records and bank/channel indexing
//!
//! The scanner stores 300 channels addressed by a linear 1-based index.
//! The front panel groups them into 10 banks of 30 channels each.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Number of channel memories
pub const CHANNEL_COUNT: u16 = 300;

/// Number of channels in one bank
pub const CHANNELS_PER_BANK: u16 = 30;

/// Number of banks
pub const BANK_COUNT: u16 = CHANNEL_COUNT / CHANNELS_PER_BANK;

/// Number of digits before the decimal point in a raw frequency
const MAJOR_DIGITS: usize = 4;

/// Length of a raw frequency field
const FREQUENCY_DIGITS: usize = 8;

/// Bank number (1-based) for a linear channel index
pub fn bank_of(index: u16) -> u16 {
    1 + index.saturating_sub(1) / CHANNELS_PER_BANK
}

/// Channel position within its bank (0-based) for a linear channel index
pub fn channel_of(index: u16) -> u16 {
    index.saturating_sub(1) % CHANNELS_PER_BANK
}

/// Format a raw 8-digit frequency for display
///
/// Leading zeros are stripped from the four major digits (keeping at least
/// one) and trailing zeros from the minor digits. The decimal point is
/// omitted when nothing is left of the minor part.
pub fn format_frequency(raw: &str) -> String {
    let split = raw.len().min(MAJOR_DIGITS);
    let (major, minor) = if raw.is_char_boundary(split) {
        raw.split_at(split)
    } else {
        (raw, "")
    };

    let major = major.trim_start_matches('0');
    let major = if major.is_empty() { "0" } else { major };
    let minor = minor.trim_end_matches('0');

    if minor.is_empty() {
        major.to_string()
    } else {
        format!("{}.{}", major, minor)
    }
}

/// A validated linear channel index in `1..=300`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelIndex(u16);

impl ChannelIndex {
    /// Create an index, returning `None` when out of range
    pub fn new(index: u16) -> Option<Self> {
        (1..=CHANNEL_COUNT).contains(&index).then_some(Self(index))
    }

    /// Iterate over every channel index in order
    pub fn all() -> impl Iterator<Item = ChannelIndex> {
        (1..=CHANNEL_COUNT).map(Self)
    }

    /// The raw 1-based index
    pub fn get(self) -> u16 {
        self.0
    }

    /// Bank number (1-based)
    pub fn bank(self) -> u16 {
        bank_of(self.0)
    }

    /// Position within the bank (0-based)
    pub fn channel(self) -> u16 {
        channel_of(self.0)
    }

    /// True for the first channel of a bank
    pub fn starts_bank(self) -> bool {
        self.channel() == 0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bank(), self.channel())
    }
}

impl FromStr for ChannelIndex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseError::InvalidIndex(s.to_string()))
    }
}

/// Channel modulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modulation {
    Am,
    Fm,
}

impl Modulation {
    /// Wire name of the modulation
    pub fn as_str(&self) -> &'static str {
        match self {
            Modulation::Am => "AM",
            Modulation::Fm => "FM",
        }
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modulation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AM" => Ok(Modulation::Am),
            "FM" => Ok(Modulation::Fm),
            _ => Err(ParseError::InvalidFrame(format!("invalid modulation: {}", s))),
        }
    }
}

/// An 8-digit zero-padded frequency in 100 Hz units, as sent by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFrequency(String);

impl RawFrequency {
    /// The frequency reported by an unprogrammed slot
    pub const UNUSED: &'static str = "00000000";

    /// Validate an 8-digit frequency field
    pub fn parse(digits: &str) -> Option<Self> {
        (digits.len() == FREQUENCY_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()))
            .then(|| Self(digits.to_string()))
    }

    /// The frequency of an unused slot
    pub fn unused() -> Self {
        Self(Self::UNUSED.to_string())
    }

    /// The raw digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the slot holding this frequency is not programmed
    pub fn is_unused(&self) -> bool {
        self.0 == Self::UNUSED
    }

    /// Human-readable MHz value
    pub fn display(&self) -> String {
        format_frequency(&self.0)
    }
}

impl fmt::Display for RawFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One channel memory as reported by `CIN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Index echoed by the scanner (not validated against the request)
    pub index: u16,
    /// Raw frequency digits
    pub frequency: RawFrequency,
    /// Modulation
    pub modulation: Modulation,
    /// Scan delay enabled
    pub delay: bool,
    /// Channel locked out of scanning
    pub lockout: bool,
    /// Priority channel
    pub priority: bool,
}

impl ChannelRecord {
    /// An unprogrammed slot at the given index
    pub fn unused(index: u16) -> Self {
        Self {
            index,
            frequency: RawFrequency::unused(),
            modulation: Modulation::Fm,
            delay: false,
            lockout: false,
            priority: false,
        }
    }

    /// True if this slot holds no frequency
    pub fn is_unused(&self) -> bool {
        self.frequency.is_unused()
    }

    /// Dump line for this record at the given position:
    /// `<bank>/<chan>,<freq>,<mod>,<delay>,<lockout>,<priority>`
    pub fn dump_line(&self, position: ChannelIndex) -> String {
        format!(
            "{},{},{},{},{},{}",
            position,
            self.frequency.display(),
            self.modulation,
            u8::from(self.delay),
            u8::from(self.lockout),
            u8::from(self.priority)
        )
    }
}
