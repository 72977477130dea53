//! Protocol parse errors.

use thiserror::Error;

use crate::Keyword;

/// Result alias for command parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A line started with a known keyword but its positional fields are unusable.
///
/// Lines with an unknown keyword are not errors; they parse to
/// [`crate::Command::Unrecognized`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token list is too short for the keyword's arity.
    #[error("{keyword}: missing field at token {index} (line has {available} tokens)")]
    MissingField {
        /// Keyword of the malformed command
        keyword: Keyword,
        /// Token index that was expected
        index: usize,
        /// Number of tokens actually present
        available: usize,
    },

    /// A numeric field did not parse.
    #[error("{keyword}: token {index} is not a valid number: {value:?}")]
    InvalidNumber {
        /// Keyword of the malformed command
        keyword: Keyword,
        /// Token index of the bad field
        index: usize,
        /// Raw token text
        value: String,
    },
}

impl ParseError {
    /// Keyword of the command that failed to parse.
    pub fn keyword(&self) -> Keyword {
        match self {
            Self::MissingField { keyword, .. } | Self::InvalidNumber { keyword, .. } => *keyword,
        }
    }
}
