//! Probe-to-Application translation layer.
//!
//! The [`Bridge`] turns [`ProbeEvent`]s from the reader thread into
//! [`AppEvent`]s for the [`crate::App`].
//!
//! # Responsibilities
//!
//! - Loads source text for shown files through a [`SourceLoader`], so tests
//!   never touch the filesystem.
//! - Converts trace and unhandled lines into timestamped trace entries. A
//!   line the dispatcher could not handle gets one `Unhandled` entry, not a
//!   command entry as well.
//! - Reports files that cannot be opened as errors instead of tabs.

use std::{collections::HashSet, io, time::Duration};

use melt_core::{DomainEvent, ProbeEvent, TraceEvent, UnhandledEvent};
use melt_proto::{Command, parse_line};

use crate::{AppEvent, TraceEntry, TraceKind};

/// Filename the compiler uses for declarations without a source file.
pub const BUILTIN_FILENAME: &str = "<built-in>";

/// Text shown for [`BUILTIN_FILENAME`].
pub const BUILTIN_CONTENT: &str = "Pseudo file, built-in.";

/// Source of file text for shown files.
pub trait SourceLoader: Send {
    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    fn load(&self, path: &str) -> io::Result<String>;
}

/// Loads files from the local filesystem. Invalid UTF-8 is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Bridge between the probe core and the App.
pub struct Bridge<L> {
    loader: L,
    /// Files already loaded. A file that failed to load is retried when shown
    /// again.
    opened: HashSet<u64>,
}

impl<L: SourceLoader> Bridge<L> {
    /// Create a bridge reading files through `loader`.
    pub fn new(loader: L) -> Self {
        Self { loader, opened: HashSet::new() }
    }

    /// Translate one probe event. `elapsed` stamps trace entries.
    pub fn translate(&mut self, event: ProbeEvent, elapsed: Duration) -> Vec<AppEvent> {
        match event {
            ProbeEvent::Trace(TraceEvent::Command { tokens }) => {
                let line = tokens.join(" ");
                // Traced once, from the UnhandledEvent that follows.
                if matches!(parse_line(&line).command, Command::Unrecognized { .. }) {
                    return vec![];
                }
                vec![trace(elapsed, TraceKind::Command, line)]
            },
            ProbeEvent::Trace(TraceEvent::Request { text }) => {
                vec![trace(elapsed, TraceKind::Request, text)]
            },
            ProbeEvent::Domain(event) => self.translate_domain(event),
            ProbeEvent::Unhandled(UnhandledEvent { tokens, reason }) => {
                vec![trace(elapsed, TraceKind::Unhandled, format!("{} ({reason})", tokens.join(" ")))]
            },
            ProbeEvent::ChannelClosed { reason } => {
                vec![AppEvent::ProbeClosed { reason: reason.to_string() }]
            },
        }
    }

    fn translate_domain(&mut self, event: DomainEvent) -> Vec<AppEvent> {
        match event {
            DomainEvent::ShowFile { file_id, filename, .. } => {
                if self.opened.contains(&file_id) {
                    return vec![];
                }
                vec![self.open_file(file_id, filename)]
            },
            DomainEvent::MarkLocation { mark_id, file_id, line, column, .. } => {
                vec![AppEvent::MarkPlaced { mark_id, file_id, line, column }]
            },
            DomainEvent::StartInfoLocation { mark_id, file_id } => {
                vec![AppEvent::InfoStarted { mark_id, file_id }]
            },
            DomainEvent::AddInfoLocation { mark_id, file_id, payload } => {
                vec![AppEvent::InfoAdded { mark_id, file_id, payload }]
            },
        }
    }

    fn open_file(&mut self, file_id: u64, filename: String) -> AppEvent {
        let content = if filename == BUILTIN_FILENAME {
            Ok(BUILTIN_CONTENT.to_owned())
        } else {
            self.loader.load(&filename)
        };

        match content {
            Ok(content) => {
                self.opened.insert(file_id);
                tracing::debug!(file_id, %filename, bytes = content.len(), "file loaded");
                AppEvent::FileOpened { file_id, filename, content }
            },
            Err(error) => {
                tracing::warn!(file_id, %filename, %error, "unable to open file");
                AppEvent::Error { message: format!("Unable to open '{filename}'") }
            },
        }
    }
}

fn trace(elapsed: Duration, kind: TraceKind, text: String) -> AppEvent {
    AppEvent::Traced(TraceEntry { elapsed, kind, text })
}
