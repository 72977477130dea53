//! MELT probe wire protocol
//!
//! The compiler side of a MELT probe session writes newline-delimited,
//! space-tokenized commands to a pipe and reads requests from a second pipe.
//! This crate holds the pure (no I/O) half of that conversation:
//!
//! - [`LineFramer`]: turns an arbitrary byte stream into complete lines
//! - [`Command`]: typed view of one line, parsed by fixed token positions
//! - [`Request`]: outbound requests and their exact wire encoding
//!
//! Everything here is deterministic and allocation-only, so the same code runs
//! under the reader thread, in tests and inside the fuzz targets.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod errors;
pub mod framer;
pub mod request;

pub use command::{Command, Keyword, ParsedLine, parse_line, tokenize};
pub use errors::{ParseError, Result};
pub use framer::LineFramer;
pub use request::Request;
