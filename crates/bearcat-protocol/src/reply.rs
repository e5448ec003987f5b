//! Reply grammars
//!
//! The protocol has no length prefixes or type tags, so every reply is
//! matched field by field against the grammar of the command that was sent.
//! Anything that deviates is rejected rather than coerced.
//!
//! | Verb | Grammar |
//! |------|---------|
//! | VER  | `VER,<text>` |
//! | MDL  | `MDL,<text>` |
//! | PRG  | `PRG,OK` |
//! | EPG  | `EPG,OK` |
//! | CIN  | `CIN,<1-3 digits>,,<8 digits>,AM\|FM,,0\|1,0\|1,0\|1` |

use tracing::trace;

use crate::channel::{ChannelRecord, RawFrequency};
use crate::command::Verb;
use crate::error::ProtocolError;
use crate::{EncodeCommand, TERMINATOR};

/// Number of comma-separated fields in a CIN reply, verb included
const CIN_FIELDS: usize = 9;

/// A parsed scanner reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Firmware version text
    Version(String),
    /// Model name
    Model(String),
    /// `OK` acknowledgement of a mode command
    ModeAck(Verb),
    /// Channel memory contents
    Channel(ChannelRecord),
}

impl Reply {
    /// The reply line without terminator
    pub fn to_line(&self) -> String {
        match self {
            Reply::Version(text) => format!("{},{}", Verb::Ver, text),
            Reply::Model(text) => format!("{},{}", Verb::Mdl, text),
            Reply::ModeAck(verb) => format!("{},OK", verb),
            Reply::Channel(record) => format!(
                "{},{},,{},{},,{},{},{}",
                Verb::Cin,
                record.index,
                record.frequency,
                record.modulation,
                u8::from(record.delay),
                u8::from(record.lockout),
                u8::from(record.priority)
            ),
        }
    }
}

impl EncodeCommand for Reply {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.to_line().into_bytes();
        bytes.push(TERMINATOR);
        bytes
    }
}

/// Parse a reply line against the grammar for `verb`
pub fn parse_reply(verb: Verb, line: &str) -> Result<Reply, ProtocolError> {
    trace!("Parsing {} reply: {:?}", verb, line);

    match verb {
        Verb::Ver => parse_text(verb, line)
            .map(Reply::Version)
            .ok_or_else(|| bad_answer(line)),
        Verb::Mdl => parse_text(verb, line)
            .map(Reply::Model)
            .ok_or_else(|| bad_answer(line)),
        Verb::Prg | Verb::Epg => {
            if is_mode_ack(verb, line) {
                Ok(Reply::ModeAck(verb))
            } else {
                Err(ProtocolError::ModeRejected {
                    verb,
                    line: line.to_string(),
                })
            }
        }
        Verb::Cin => parse_channel(line)
            .map(Reply::Channel)
            .ok_or_else(|| bad_answer(line)),
    }
}

fn bad_answer(line: &str) -> ProtocolError {
    ProtocolError::BadAnswer(line.to_string())
}

/// `VERB,<text>` where text may be empty but may not span lines
fn parse_text(verb: Verb, line: &str) -> Option<String> {
    let text = line.strip_prefix(verb.as_str())?.strip_prefix(',')?;
    if text.contains(['\r', '\n']) {
        return None;
    }
    Some(text.to_string())
}

fn is_mode_ack(verb: Verb, line: &str) -> bool {
    line.strip_prefix(verb.as_str()) == Some(",OK")
}

fn parse_channel(line: &str) -> Option<ChannelRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != CIN_FIELDS {
        return None;
    }

    // Name and CTCSS fields are always empty in this firmware
    if fields[0] != Verb::Cin.as_str() || !fields[2].is_empty() || !fields[5].is_empty() {
        return None;
    }

    let index = fields[1];
    if index.is_empty() || index.len() > 3 || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(ChannelRecord {
        index: index.parse().ok()?,
        frequency: RawFrequency::parse(fields[3])?,
        modulation: fields[4].parse().ok()?,
        delay: parse_flag(fields[6])?,
        lockout: parse_flag(fields[7])?,
        priority: parse_flag(fields[8])?,
    })
}

fn parse_flag(field: &str) -> Option<bool> {
    match field {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
