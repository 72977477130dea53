//! Inbound command grammar.
//!
//! A command is one framed line split on single spaces. The first token is the
//! keyword; every other field lives at a fixed token index:
//!
//! | Keyword | Fields |
//! |---|---|
//! | `SHOWFILE_PCD` | filename at 2 (quoted), file id at 4 |
//! | `MARKLOCATION_PCD` | mark id 1, file id 2, line 3, column 4 (1-based) |
//! | `STARTINFOLOC_PCD` | mark id 1 |
//! | `ADDINFOLOC_PCD` | mark id 1, payload from 2 onwards |
//!
//! Repeated spaces are not collapsed: `"a  b"` has an empty middle token, and
//! that empty token counts towards the field positions.

use std::{fmt, str::FromStr};

use crate::errors::{ParseError, Result};

/// Separator between `ADDINFOLOC_PCD` payload segments once the payload tokens
/// are re-joined with single spaces.
pub const PAYLOAD_SEPARATOR: &str = "\"   \"";

/// Keywords the probe understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Open a source file.
    ShowFile,
    /// Bind a mark to a file position.
    MarkLocation,
    /// Start of an info block for a mark.
    StartInfoLocation,
    /// Info payload for a mark.
    AddInfoLocation,
}

impl Keyword {
    /// All keywords, in wire order of appearance in a typical session.
    pub const ALL: [Self; 4] =
        [Self::ShowFile, Self::MarkLocation, Self::StartInfoLocation, Self::AddInfoLocation];

    /// Wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShowFile => "SHOWFILE_PCD",
            Self::MarkLocation => "MARKLOCATION_PCD",
            Self::StartInfoLocation => "STARTINFOLOC_PCD",
            Self::AddInfoLocation => "ADDINFOLOC_PCD",
        }
    }

    /// Exact match of a token against the keyword set.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == token)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SHOWFILE_PCD`
    ShowFile {
        /// Protocol-assigned file id
        file_id: u64,
        /// Path with surrounding quotes removed
        filename: String,
    },

    /// `MARKLOCATION_PCD`
    MarkLocation {
        /// Protocol-assigned mark id
        mark_id: u64,
        /// File the mark points into
        file_id: u64,
        /// 0-based line
        line: u32,
        /// 0-based column
        column: u32,
    },

    /// `STARTINFOLOC_PCD`
    StartInfoLocation {
        /// Mark the info block belongs to
        mark_id: u64,
    },

    /// `ADDINFOLOC_PCD`
    AddInfoLocation {
        /// Mark the payload belongs to
        mark_id: u64,
        /// Payload segments, split on [`PAYLOAD_SEPARATOR`]
        payload: Vec<String>,
    },

    /// Any line whose first token is not a known keyword.
    Unrecognized {
        /// All tokens of the line
        tokens: Vec<String>,
    },
}

impl Command {
    /// Parse a framed line (delimiter already stripped).
    ///
    /// # Errors
    ///
    /// - `ParseError::MissingField` if a known keyword has too few tokens
    /// - `ParseError::InvalidNumber` if a numeric field does not parse
    pub fn parse(line: &str) -> Result<Self> {
        let tokens = tokenize(line);
        let Some(keyword) = tokens.first().and_then(|t| Keyword::from_token(t)) else {
            return Ok(Self::Unrecognized {
                tokens: tokens.iter().map(|t| (*t).to_owned()).collect(),
            });
        };

        let fields = Fields { keyword, tokens: &tokens };
        match keyword {
            Keyword::ShowFile => Ok(Self::ShowFile {
                filename: fields.get(2)?.trim_matches('"').to_owned(),
                file_id: fields.number(4)?,
            }),
            Keyword::MarkLocation => Ok(Self::MarkLocation {
                mark_id: fields.number(1)?,
                file_id: fields.number(2)?,
                line: fields.coordinate(3)?,
                column: fields.coordinate(4)?,
            }),
            Keyword::StartInfoLocation => Ok(Self::StartInfoLocation { mark_id: fields.number(1)? }),
            Keyword::AddInfoLocation => {
                let mark_id = fields.number(1)?;
                let joined = tokens.get(2..).unwrap_or_default().join(" ");
                let payload = joined.split(PAYLOAD_SEPARATOR).map(str::to_owned).collect();
                Ok(Self::AddInfoLocation { mark_id, payload })
            },
        }
    }

    /// Keyword of this command. `None` for [`Command::Unrecognized`].
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Self::ShowFile { .. } => Some(Keyword::ShowFile),
            Self::MarkLocation { .. } => Some(Keyword::MarkLocation),
            Self::StartInfoLocation { .. } => Some(Keyword::StartInfoLocation),
            Self::AddInfoLocation { .. } => Some(Keyword::AddInfoLocation),
            Self::Unrecognized { .. } => None,
        }
    }
}

/// A line parsed without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The command, [`Command::Unrecognized`] if parsing failed.
    pub command: Command,
    /// Why a known keyword was downgraded to [`Command::Unrecognized`].
    pub error: Option<ParseError>,
}

/// Parse a line, downgrading malformed commands to [`Command::Unrecognized`].
///
/// The error is kept alongside so callers can report it.
pub fn parse_line(line: &str) -> ParsedLine {
    match Command::parse(line) {
        Ok(command) => ParsedLine { command, error: None },
        Err(error) => ParsedLine {
            command: Command::Unrecognized {
                tokens: tokenize(line).into_iter().map(str::to_owned).collect(),
            },
            error: Some(error),
        },
    }
}

/// Split a line on single spaces, keeping empty tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').collect()
}

/// Positional field access for one keyword's token list.
struct Fields<'a, 'b> {
    keyword: Keyword,
    tokens: &'b [&'a str],
}

impl<'a> Fields<'a, '_> {
    fn get(&self, index: usize) -> Result<&'a str> {
        self.tokens.get(index).copied().ok_or(ParseError::MissingField {
            keyword: self.keyword,
            index,
            available: self.tokens.len(),
        })
    }

    /// Surrounding ASCII whitespace is ignored, so a `\r` left by a CRLF peer
    /// does not break the last field.
    fn number<T: FromStr>(&self, index: usize) -> Result<T> {
        let raw = self.get(index)?;
        raw.trim_ascii().parse().map_err(|_| self.invalid_number(index, raw))
    }

    /// 1-based wire coordinate to 0-based, floored at zero.
    ///
    /// Coordinates past `u32::MAX` are rejected rather than clamped.
    fn coordinate(&self, index: usize) -> Result<u32> {
        let raw = self.get(index)?;
        let wire: i64 = self.number(index)?;
        let zero_based = wire.saturating_sub(1).max(0);
        u32::try_from(zero_based).map_err(|_| self.invalid_number(index, raw))
    }

    fn invalid_number(&self, index: usize, raw: &str) -> ParseError {
        ParseError::InvalidNumber { keyword: self.keyword, index, value: raw.to_owned() }
    }
}
