//! Bus transfer stimulus lists.
//!
//! One operation per line, fields separated by whitespace:
//!
//! ```text
//! R <size> <address>          read 1, 2 or 4 bytes
//! B <address>                 long-word read with a line fill request
//! W <size> <address> <data>   write the low <size> bytes of <data>
//! ```
//!
//! Sizes are decimal; addresses and data are hexadecimal with an optional
//! `0x` prefix. Blank lines and lines starting with `;` are ignored. Sizes
//! are not range-checked here: the bus master decides what it accepts.

use std::fmt;

use thiserror::Error;

/// One bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Read { size: u8, address: u32 },
    BurstRead { address: u32 },
    Write { size: u8, address: u32, data: u32 },
}

impl Command {
    #[must_use]
    pub const fn address(&self) -> u32 {
        match *self {
            Self::Read { address, .. }
            | Self::BurstRead { address }
            | Self::Write { address, .. } => address,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { size, address } => write!(f, "R {size} {address:08X}"),
            Self::BurstRead { address } => write!(f, "B {address:08X}"),
            Self::Write {
                size,
                address,
                data,
            } => write!(f, "W {size} {address:08X} {data:08X}"),
        }
    }
}

/// A command and the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stimulus {
    pub line: usize,
    pub command: Command,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid {field} '{text}'")]
    InvalidNumber { field: &'static str, text: String },

    #[error("unexpected trailing field '{0}'")]
    TrailingField(String),
}

/// A line that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub text: String,
    pub error: ParseError,
}

/// Parsed stimulus file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoList {
    pub stimuli: Vec<Stimulus>,
    pub skipped: Vec<SkippedLine>,
}

impl IoList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.stimuli.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stimuli.is_empty()
    }
}

/// Parse a single line. Blank lines and comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let Some(op) = fields.next() else {
        return Ok(None);
    };

    let command = match op {
        "R" => Command::Read {
            size: size(fields.next())?,
            address: hex(fields.next(), "address")?,
        },
        "B" => Command::BurstRead {
            address: hex(fields.next(), "address")?,
        },
        "W" => Command::Write {
            size: size(fields.next())?,
            address: hex(fields.next(), "address")?,
            data: hex(fields.next(), "data")?,
        },
        other => return Err(ParseError::UnknownOperation(other.to_string())),
    };

    if let Some(extra) = fields.next() {
        return Err(ParseError::TrailingField(extra.to_string()));
    }
    Ok(Some(command))
}

/// Parse a whole stimulus file.
///
/// Malformed lines are logged and collected in [`IoList::skipped`]; they
/// never stop the rest of the file from being read.
#[must_use]
pub fn parse(text: &str) -> IoList {
    let mut list = IoList::default();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        match parse_line(raw) {
            Ok(Some(command)) => list.stimuli.push(Stimulus { line, command }),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(line, %error, "skipping malformed stimulus line");
                list.skipped.push(SkippedLine {
                    line,
                    text: raw.to_string(),
                    error,
                });
            }
        }
    }
    list
}

fn size(field: Option<&str>) -> Result<u8, ParseError> {
    let text = field.ok_or(ParseError::MissingField("size"))?;
    text.parse().map_err(|_| ParseError::InvalidNumber {
        field: "size",
        text: text.to_string(),
    })
}

fn hex(field: Option<&str>, name: &'static str) -> Result<u32, ParseError> {
    let text = field.ok_or(ParseError::MissingField(name))?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidNumber {
        field: name,
        text: text.to_string(),
    })
}
