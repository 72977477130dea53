//! Application input events.
//!
//! [`AppEvent`] is the full set of inputs that drive the [`crate::App`] state
//! machine. Events originate from two sources:
//! - User interactions (keyboard, resize) and ticks from the driver.
//! - Probe events translated by the [`crate::Bridge`].

use crate::{KeyInput, TraceEntry};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// A file was announced and its text loaded.
    FileOpened {
        /// Protocol-assigned file id.
        file_id: u64,
        /// Path as sent by the compiler.
        filename: String,
        /// Source text.
        content: String,
    },

    /// A mark was placed in a file.
    MarkPlaced {
        /// Protocol-assigned mark id.
        mark_id: u64,
        /// File the mark belongs to.
        file_id: u64,
        /// 0-based line.
        line: u32,
        /// 0-based column.
        column: u32,
    },

    /// The compiler started describing a mark.
    InfoStarted {
        /// Mark being described.
        mark_id: u64,
        /// File owning the mark.
        file_id: u64,
    },

    /// The compiler sent information about a mark.
    InfoAdded {
        /// Mark being described.
        mark_id: u64,
        /// File owning the mark.
        file_id: u64,
        /// Payload entries.
        payload: Vec<String>,
    },

    /// Entry for the trace log.
    Traced(TraceEntry),

    /// The command descriptor stopped delivering.
    ProbeClosed {
        /// Human readable reason.
        reason: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
