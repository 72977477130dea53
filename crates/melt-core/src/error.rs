//! Error types for the probe core.
//!
//! One enum per failure domain:
//! - [`DispatchError`]: a well-formed command refers to state we never saw
//! - [`ReplyError`]: writing a request to the compiler failed
//! - [`ChannelError`]: the reader thread could not start or poll
//!
//! Malformed lines are not errors at this level; the dispatcher downgrades them
//! to [`crate::UnhandledEvent`]s.

use std::io;

use thiserror::Error;

/// Errors from dispatching a parsed command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Command references a mark that no `MARKLOCATION_PCD` registered.
    #[error("{context}: unknown mark {mark_id}")]
    UnknownMarkReference {
        /// Wire keyword of the command or request that carried the reference
        context: &'static str,
        /// Mark id that failed to resolve
        mark_id: u64,
    },
}

/// Errors from writing to the request descriptor.
#[derive(Error, Debug)]
pub enum ReplyError {
    /// Write or flush failed.
    #[error("failed to write request: {0}")]
    Io(#[from] io::Error),

    /// Another writer panicked while holding the descriptor.
    #[error("request writer lock poisoned")]
    Poisoned,
}

/// Errors from the command reader.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Thread spawn or read failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `poll(2)` failed.
    #[error("poll failed: {0}")]
    Poll(#[from] nix::errno::Errno),
}

impl ChannelError {
    /// Returns true if the read may succeed when retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(e) => {
                matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
            },
            Self::Poll(errno) => *errno == nix::errno::Errno::EINTR,
        }
    }
}
