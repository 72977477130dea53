//! Events flowing from the reader thread to the presentation task.
//!
//! Every inbound line produces a [`TraceEvent`] and at most one of
//! [`DomainEvent`] or [`UnhandledEvent`]. The reply path adds
//! [`TraceEvent::Request`]s to the same queue.
//!
//! The queue preserves send order per sender. The reader and the reply
//! channel are separate senders, so a request trace may interleave anywhere
//! between command events.

use melt_proto::ParseError;
use tokio::sync::mpsc;

/// Sending half of the probe event queue.
pub type ProbeSender = mpsc::UnboundedSender<ProbeEvent>;

/// Receiving half of the probe event queue.
pub type ProbeReceiver = mpsc::UnboundedReceiver<ProbeEvent>;

/// Create the ordered, unbounded probe event queue.
///
/// Unbounded: senders never block on the presentation task.
pub fn probe_queue() -> (ProbeSender, ProbeReceiver) {
    mpsc::unbounded_channel()
}

/// Everything the presentation task can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// Audit record of traffic on either pipe.
    Trace(TraceEvent),
    /// Successfully dispatched command.
    Domain(DomainEvent),
    /// Line the probe could not act on.
    Unhandled(UnhandledEvent),
    /// The command reader stopped.
    ChannelClosed {
        /// Why the reader stopped
        reason: CloseReason,
    },
}

/// Audit record of raw traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Line received from the compiler, as tokens.
    Command {
        /// Tokens of the raw line
        tokens: Vec<String>,
    },
    /// Request sent to the compiler, without terminator.
    Request {
        /// Request text
        text: String,
    },
}

/// Typed result of a recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A file should be shown.
    ShowFile {
        /// Protocol file id
        file_id: u64,
        /// Path of the file. For duplicates this is the first registered path.
        filename: String,
        /// False if this file id was already registered
        newly_registered: bool,
    },

    /// A mark was placed.
    MarkLocation {
        /// Protocol mark id
        mark_id: u64,
        /// File the mark points into
        file_id: u64,
        /// 0-based line
        line: u32,
        /// 0-based column
        column: u32,
        /// False if this mark id was already registered
        newly_registered: bool,
    },

    /// Info about a mark is about to follow.
    StartInfoLocation {
        /// Mark the info belongs to
        mark_id: u64,
        /// File the mark is bound to
        file_id: u64,
    },

    /// Info payload for a mark.
    AddInfoLocation {
        /// Mark the info belongs to
        mark_id: u64,
        /// File the mark is bound to
        file_id: u64,
        /// Payload segments
        payload: Vec<String>,
    },
}

/// A line that produced no domain event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledEvent {
    /// Tokens of the raw line
    pub tokens: Vec<String>,
    /// Why the line was not handled
    pub reason: UnhandledReason,
}

/// Why a line was not handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnhandledReason {
    /// First token is not a known keyword.
    UnknownKeyword,
    /// Known keyword with unusable fields.
    Malformed(ParseError),
}

impl std::fmt::Display for UnhandledReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKeyword => f.write_str("unknown keyword"),
            Self::Malformed(e) => write!(f, "malformed command: {e}"),
        }
    }
}

/// Why the command reader stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Read returned zero bytes.
    EndOfStream,
    /// The descriptor reported hang-up with nothing left to read.
    HangUp,
    /// Shutdown was requested.
    Shutdown,
    /// Nobody is listening for events anymore.
    ReceiverDropped,
    /// Read or poll failed.
    Error(String),
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfStream => f.write_str("end of stream"),
            Self::HangUp => f.write_str("peer hung up"),
            Self::Shutdown => f.write_str("shutdown requested"),
            Self::ReceiverDropped => f.write_str("event receiver dropped"),
            Self::Error(message) => write!(f, "read failed: {message}"),
        }
    }
}
