//! Application state machine.
//!
//! [`App`] manages the interactive state of the probe, decoupled from pipes
//! and terminals. It consumes [`crate::AppEvent`] inputs and produces
//! [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Keeps one tab per shown file, in the order the compiler showed them.
//! - Attaches marks to their file, holding them back until the file's tab
//!   exists.
//! - Collects information sent for marks.
//! - Keeps a bounded trace log of commands and requests.

use std::collections::{HashMap, VecDeque};

use crate::{AppAction, AppEvent, FileView, KeyInput, MarkView, TraceEntry};

/// Presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Show the trace pane on start.
    pub trace_visible: bool,
    /// Trace entries kept for display. Older entries are dropped first.
    pub max_trace_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { trace_visible: false, max_trace_entries: 1000 }
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    /// Open files in tab order.
    files: Vec<FileView>,
    /// Index into `files` of the active tab.
    active: Option<usize>,
    /// Marks whose file has no tab yet, keyed by file id.
    pending_marks: HashMap<u64, Vec<MarkView>>,
    trace: VecDeque<TraceEntry>,
    trace_visible: bool,
    /// Whether the command descriptor is still delivering.
    probe_open: bool,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl App {
    /// Create an App with no files.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            files: Vec::new(),
            active: None,
            pending_marks: HashMap::new(),
            trace: VecDeque::new(),
            trace_visible: config.trace_visible,
            probe_open: true,
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::FileOpened { file_id, filename, content } => {
                self.open_file(FileView::new(file_id, filename, &content))
            },
            AppEvent::MarkPlaced { mark_id, file_id, line, column } => {
                self.place_mark(file_id, MarkView::new(mark_id, line, column))
            },
            AppEvent::InfoStarted { mark_id, file_id } => {
                if let Some(mark) = self.mark_mut(file_id, mark_id) {
                    mark.info_started = true;
                    mark.info.clear();
                }
                vec![AppAction::Render]
            },
            AppEvent::InfoAdded { mark_id, file_id, payload } => {
                if let Some(mark) = self.mark_mut(file_id, mark_id) {
                    mark.info.extend(payload);
                }
                vec![AppAction::Render]
            },
            AppEvent::Traced(entry) => {
                self.push_trace(entry);
                if self.trace_visible { vec![AppAction::Render] } else { vec![] }
            },
            AppEvent::ProbeClosed { reason } => {
                self.probe_open = false;
                self.status_message = Some(format!("Probe closed: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc | KeyInput::Char('q') => self.quit(),
            KeyInput::Char('t') => {
                self.trace_visible = !self.trace_visible;
                vec![AppAction::Render]
            },
            KeyInput::Tab => self.cycle_file(true),
            KeyInput::BackTab => self.cycle_file(false),
            KeyInput::Down => {
                if let Some(file) = self.active_file_mut() {
                    file.select_next();
                }
                vec![AppAction::Render]
            },
            KeyInput::Up => {
                if let Some(file) = self.active_file_mut() {
                    file.select_previous();
                }
                vec![AppAction::Render]
            },
            KeyInput::Enter => match self.selected_mark().map(|m| m.mark_id) {
                Some(mark_id) => self.request_info_location(mark_id),
                None => {
                    self.status_message = Some("No mark selected".into());
                    vec![AppAction::Render]
                },
            },
            KeyInput::Char(_) => vec![],
        }
    }

    fn open_file(&mut self, mut view: FileView) -> Vec<AppAction> {
        if self.file(view.file_id).is_some() {
            return vec![];
        }

        for mark in self.pending_marks.remove(&view.file_id).unwrap_or_default() {
            view.add_mark(mark);
        }

        self.status_message = Some(format!("Showing {}", view.filename));
        self.files.push(view);
        if self.active.is_none() {
            self.active = Some(self.files.len() - 1);
        }
        vec![AppAction::Render]
    }

    fn place_mark(&mut self, file_id: u64, mark: MarkView) -> Vec<AppAction> {
        if let Some(file) = self.files.iter_mut().find(|f| f.file_id == file_id) {
            file.add_mark(mark);
            return vec![AppAction::Render];
        }

        let pending = self.pending_marks.entry(file_id).or_default();
        if !pending.iter().any(|m| m.mark_id == mark.mark_id) {
            pending.push(mark);
        }
        vec![]
    }

    fn mark_mut(&mut self, file_id: u64, mark_id: u64) -> Option<&mut MarkView> {
        if let Some(file) = self.files.iter_mut().find(|f| f.file_id == file_id) {
            return file.mark_mut(mark_id);
        }
        self.pending_marks.get_mut(&file_id)?.iter_mut().find(|m| m.mark_id == mark_id)
    }

    fn push_trace(&mut self, entry: TraceEntry) {
        self.trace.push_back(entry);
        while self.trace.len() > self.config.max_trace_entries {
            self.trace.pop_front();
        }
    }

    fn cycle_file(&mut self, forward: bool) -> Vec<AppAction> {
        let len = self.files.len();
        if len == 0 {
            return vec![];
        }

        self.active = Some(match (self.active, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
        vec![AppAction::Render]
    }

    fn active_file_mut(&mut self) -> Option<&mut FileView> {
        self.active.and_then(|i| self.files.get_mut(i))
    }

    /// Ask the compiler about a mark.
    pub fn request_info_location(&mut self, mark_id: u64) -> Vec<AppAction> {
        self.status_message = Some(format!("Requested info for mark {mark_id}"));
        vec![AppAction::RequestInfoLocation { mark_id }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Open files in tab order.
    pub fn files(&self) -> &[FileView] {
        &self.files
    }

    /// Look up a file tab by id.
    pub fn file(&self, file_id: u64) -> Option<&FileView> {
        self.files.iter().find(|f| f.file_id == file_id)
    }

    /// Index of the active tab. `None` if no file is shown.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The active file tab. `None` if no file is shown.
    pub fn active_file(&self) -> Option<&FileView> {
        self.active.and_then(|i| self.files.get(i))
    }

    /// Selected mark in the active file.
    pub fn selected_mark(&self) -> Option<&MarkView> {
        self.active_file().and_then(FileView::selected_mark)
    }

    /// Number of marks waiting for their file.
    pub fn pending_mark_count(&self) -> usize {
        self.pending_marks.values().map(Vec::len).sum()
    }

    /// Trace log, oldest first.
    pub fn trace(&self) -> impl DoubleEndedIterator<Item = &TraceEntry> + ExactSizeIterator {
        self.trace.iter()
    }

    /// Whether the trace pane is shown.
    pub fn trace_visible(&self) -> bool {
        self.trace_visible
    }

    /// Whether the command descriptor is still delivering.
    pub fn probe_open(&self) -> bool {
        self.probe_open
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::TraceKind;

    fn opened(file_id: u64, filename: &str) -> AppEvent {
        AppEvent::FileOpened { file_id, filename: filename.into(), content: "a\nb\nc\n".into() }
    }

    fn mark(mark_id: u64, file_id: u64, line: u32) -> AppEvent {
        AppEvent::MarkPlaced { mark_id, file_id, line, column: 0 }
    }

    fn traced(text: &str) -> AppEvent {
        AppEvent::Traced(TraceEntry {
            elapsed: Duration::ZERO,
            kind: TraceKind::Command,
            text: text.into(),
        })
    }

    #[test]
    fn first_file_becomes_active() {
        let mut app = App::default();
        let _ = app.handle(opened(3, "a.c"));
        let _ = app.handle(opened(4, "b.c"));

        assert_eq!(app.active_file().map(|f| f.file_id), Some(3));
        assert_eq!(app.files().len(), 2);
    }

    #[test]
    fn duplicate_file_keeps_existing_tab() {
        let mut app = App::default();
        let _ = app.handle(opened(3, "a.c"));
        let _ = app.handle(mark(7, 3, 1));

        let actions = app.handle(opened(3, "other.c"));
        assert!(actions.is_empty());
        assert_eq!(app.files().len(), 1);
        assert_eq!(app.file(3).map(|f| f.filename.as_str()), Some("a.c"));
        assert_eq!(app.file(3).map(|f| f.marks().len()), Some(1));
    }

    #[test]
    fn pending_marks_attach_when_tab_opens() {
        let mut app = App::default();
        let _ = app.handle(mark(1, 5, 0));
        let _ = app.handle(mark(1, 5, 0));
        assert_eq!(app.pending_mark_count(), 1);

        let _ = app.handle(AppEvent::InfoAdded { mark_id: 1, file_id: 5, payload: vec![
            "early".into(),
        ] });
        let _ = app.handle(opened(5, "late.c"));

        assert_eq!(app.pending_mark_count(), 0);
        let attached = app.file(5).and_then(|f| f.mark(1)).cloned();
        assert_eq!(attached.map(|m| m.info), Some(vec!["early".to_string()]));
    }

    #[test]
    fn info_start_resets_previous_payload() {
        let mut app = App::default();
        let _ = app.handle(opened(1, "a.c"));
        let _ = app.handle(mark(2, 1, 0));
        let _ = app.handle(AppEvent::InfoAdded { mark_id: 2, file_id: 1, payload: vec![
            "old".into(),
        ] });

        let _ = app.handle(AppEvent::InfoStarted { mark_id: 2, file_id: 1 });
        let _ = app.handle(AppEvent::InfoAdded { mark_id: 2, file_id: 1, payload: vec![
            "x".into(),
            "y".into(),
        ] });

        let view = app.file(1).and_then(|f| f.mark(2)).cloned();
        assert!(view.as_ref().is_some_and(|m| m.info_started));
        assert_eq!(view.map(|m| m.info), Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn enter_requests_selected_mark() {
        let mut app = App::default();
        let _ = app.handle(opened(1, "a.c"));
        let _ = app.handle(mark(8, 1, 2));

        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![
            AppAction::RequestInfoLocation { mark_id: 8 },
            AppAction::Render
        ]);
    }

    #[test]
    fn enter_without_selection_only_reports() {
        let mut app = App::default();
        let _ = app.handle(opened(1, "a.c"));

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("No mark selected"));
    }

    #[test]
    fn tab_cycles_files_both_ways() {
        let mut app = App::default();
        for id in [1, 2, 3] {
            let _ = app.handle(opened(id, "f.c"));
        }

        let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        assert_eq!(app.active_file().map(|f| f.file_id), Some(2));

        let _ = app.handle(AppEvent::Key(KeyInput::BackTab));
        let _ = app.handle(AppEvent::Key(KeyInput::BackTab));
        assert_eq!(app.active_file().map(|f| f.file_id), Some(3));
    }

    #[test]
    fn trace_is_capped_and_toggled() {
        let mut app = App::new(AppConfig { trace_visible: false, max_trace_entries: 2 });
        assert!(app.handle(traced("one")).is_empty());
        let _ = app.handle(traced("two"));
        let _ = app.handle(traced("three"));

        let texts: Vec<_> = app.trace().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);

        let _ = app.handle(AppEvent::Key(KeyInput::Char('t')));
        assert!(app.trace_visible());
        assert_eq!(app.handle(traced("four")), vec![AppAction::Render]);
    }

    #[test]
    fn quit_keys() {
        let mut app = App::default();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), vec![AppAction::Quit]);
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Char('q'))), vec![AppAction::Quit]);
    }

    #[test]
    fn probe_close_is_reported() {
        let mut app = App::default();
        let _ = app.handle(AppEvent::ProbeClosed { reason: "end of stream".into() });

        assert!(!app.probe_open());
        assert_eq!(app.status_message(), Some("Probe closed: end of stream"));
    }
}
