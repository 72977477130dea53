//! Command dispatch.
//!
//! The [`Dispatcher`] owns the [`SessionState`] and classifies each framed
//! line independently; there is no session phase. For every line it returns a
//! [`Dispatch`] holding the trace record and one [`Outcome`].
//!
//! # Outcomes
//!
//! - `SHOWFILE_PCD` / `MARKLOCATION_PCD`: registered first-write-wins, then
//!   emitted with the stored record whether or not the registration was
//!   fresh. Consumers must treat repeated show/mark events for the same id as
//!   idempotent.
//! - `STARTINFOLOC_PCD` / `ADDINFOLOC_PCD`: the mark is resolved to its file.
//!   An unknown mark is reported and the event suppressed.
//! - Unknown keywords and malformed lines become [`UnhandledEvent`]s.
//!
//! No outcome stops dispatch of the next line.

use melt_proto::{Command, Keyword, ParsedLine, parse_line, tokenize};

use crate::{
    DispatchError, DomainEvent, FileRecord, MarkRecord, ProbeEvent, SessionState, TraceEvent,
    UnhandledEvent, UnhandledReason,
};

/// Result of dispatching one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Audit record, produced for every line.
    pub trace: TraceEvent,
    /// What the line amounted to.
    pub outcome: Outcome,
}

/// Classification of a dispatched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Recognized command with resolved state.
    Domain(DomainEvent),
    /// Unknown or malformed line.
    Unhandled(UnhandledEvent),
    /// Well-formed command whose references did not resolve.
    Suppressed(DispatchError),
}

impl Dispatch {
    /// Events to forward to the presentation task, trace first.
    ///
    /// Suppressed outcomes forward only the trace.
    pub fn into_events(self) -> Vec<ProbeEvent> {
        let mut events = vec![ProbeEvent::Trace(self.trace)];
        match self.outcome {
            Outcome::Domain(event) => events.push(ProbeEvent::Domain(event)),
            Outcome::Unhandled(event) => events.push(ProbeEvent::Unhandled(event)),
            Outcome::Suppressed(_) => {},
        }
        events
    }
}

/// Protocol dispatcher. Single owner of the session state.
#[derive(Debug, Default)]
pub struct Dispatcher {
    session: SessionState,
}

impl Dispatcher {
    /// Create a dispatcher with an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Dispatch one framed line.
    pub fn dispatch(&mut self, line: &str) -> Dispatch {
        let tokens: Vec<String> = tokenize(line).into_iter().map(str::to_owned).collect();
        tracing::debug!(%line, "dispatcher receive");

        let ParsedLine { command, error } = parse_line(line);
        let outcome = match command {
            Command::ShowFile { file_id, filename } => {
                Outcome::Domain(self.show_file(file_id, filename))
            },
            Command::MarkLocation { mark_id, file_id, line, column } => {
                Outcome::Domain(self.mark_location(MarkRecord { mark_id, file_id, line, column }))
            },
            Command::StartInfoLocation { mark_id } => Self::resolved(
                self.resolve(Keyword::StartInfoLocation.as_str(), mark_id)
                    .map(|file_id| DomainEvent::StartInfoLocation { mark_id, file_id }),
            ),
            Command::AddInfoLocation { mark_id, payload } => Self::resolved(
                self.resolve(Keyword::AddInfoLocation.as_str(), mark_id)
                    .map(|file_id| DomainEvent::AddInfoLocation { mark_id, file_id, payload }),
            ),
            Command::Unrecognized { .. } => {
                let reason =
                    error.map_or(UnhandledReason::UnknownKeyword, UnhandledReason::Malformed);
                Self::unhandled(tokens.clone(), reason)
            },
        };

        Dispatch { trace: TraceEvent::Command { tokens }, outcome }
    }

    fn show_file(&mut self, file_id: u64, filename: String) -> DomainEvent {
        let newly_registered =
            self.session.register_file(FileRecord::new(file_id, filename.clone()));
        let filename =
            self.session.file(file_id).map_or(filename, |record| record.filename.clone());
        DomainEvent::ShowFile { file_id, filename, newly_registered }
    }

    fn mark_location(&mut self, mark: MarkRecord) -> DomainEvent {
        let newly_registered = self.session.register_mark(mark);
        let mark = self.session.mark(mark.mark_id).copied().unwrap_or(mark);
        if self.session.file(mark.file_id).is_none() {
            tracing::debug!(mark.mark_id, mark.file_id, "mark references a file not shown yet");
        }
        let MarkRecord { mark_id, file_id, line, column } = mark;
        DomainEvent::MarkLocation { mark_id, file_id, line, column, newly_registered }
    }

    fn resolve(&self, context: &'static str, mark_id: u64) -> Result<u64, DispatchError> {
        self.session
            .mark(mark_id)
            .map(|mark| mark.file_id)
            .ok_or(DispatchError::UnknownMarkReference { context, mark_id })
    }

    fn resolved(result: Result<DomainEvent, DispatchError>) -> Outcome {
        match result {
            Ok(event) => Outcome::Domain(event),
            Err(e) => {
                tracing::warn!(error = %e, "command suppressed");
                Outcome::Suppressed(e)
            },
        }
    }

    fn unhandled(tokens: Vec<String>, reason: UnhandledReason) -> Outcome {
        tracing::warn!(?tokens, %reason, "unhandled command");
        Outcome::Unhandled(UnhandledEvent { tokens, reason })
    }
}
