//! Observable application state types.
//!
//! These structures are the view model: the subset of probe state a frontend
//! needs to draw file tabs, mark indicators and the trace log.

use std::{path::Path, time::Duration};

/// Syntax family used for a file.
///
/// Only the selection is modelled; frontends may use it for a header label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexer {
    /// C and C++ sources and headers.
    Cpp,
    /// Everything else.
    Shell,
}

impl Lexer {
    /// Pick a lexer from the file extension.
    pub fn for_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("c" | "cpp" | "h" | "hpp") => Self::Cpp,
            _ => Self::Shell,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpp => "C/C++",
            Self::Shell => "Shell",
        }
    }
}

/// A mark as shown in a file view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkView {
    /// Protocol-assigned mark id.
    pub mark_id: u64,
    /// 0-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
    /// Whether the compiler has started describing this mark.
    pub info_started: bool,
    /// Information received for this mark, in arrival order.
    pub info: Vec<String>,
}

impl MarkView {
    /// New mark with no information yet.
    pub fn new(mark_id: u64, line: u32, column: u32) -> Self {
        Self { mark_id, line, column, info_started: false, info: Vec::new() }
    }

    /// Indicator key, `line:column`.
    pub fn position(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}

/// One open file tab.
#[derive(Debug, Clone)]
pub struct FileView {
    /// Protocol-assigned file id.
    pub file_id: u64,
    /// Path as sent by the compiler.
    pub filename: String,
    /// Syntax family.
    pub lexer: Lexer,
    /// Source text split into lines.
    pub lines: Vec<String>,
    /// Marks ordered by position, then id.
    marks: Vec<MarkView>,
    /// Index into `marks` of the selected mark.
    selected: Option<usize>,
}

impl FileView {
    /// Create a view over `content`.
    pub fn new(file_id: u64, filename: impl Into<String>, content: &str) -> Self {
        let filename = filename.into();
        Self {
            file_id,
            lexer: Lexer::for_path(&filename),
            lines: content.lines().map(str::to_owned).collect(),
            filename,
            marks: Vec::new(),
            selected: None,
        }
    }

    /// Tab label, `[<file_id>] <basename>`.
    pub fn label(&self) -> String {
        let basename = Path::new(&self.filename)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.filename);
        format!("[{}] {basename}", self.file_id)
    }

    /// Attach a mark. Returns false if the mark id is already attached.
    pub fn add_mark(&mut self, mark: MarkView) -> bool {
        if self.marks.iter().any(|m| m.mark_id == mark.mark_id) {
            return false;
        }

        let selected_id = self.selected_mark().map(|m| m.mark_id);
        let key = (mark.line, mark.column, mark.mark_id);
        let at = self.marks.partition_point(|m| (m.line, m.column, m.mark_id) < key);
        self.marks.insert(at, mark);

        // Keep the selection on the same mark after the insert shifted indices
        self.selected = selected_id.and_then(|id| self.marks.iter().position(|m| m.mark_id == id));
        true
    }

    /// Marks ordered by position.
    pub fn marks(&self) -> &[MarkView] {
        &self.marks
    }

    /// Marks on a 0-based line.
    pub fn marks_on_line(&self, line: u32) -> impl Iterator<Item = &MarkView> {
        self.marks.iter().filter(move |m| m.line == line)
    }

    /// Look up a mark by id.
    pub fn mark(&self, mark_id: u64) -> Option<&MarkView> {
        self.marks.iter().find(|m| m.mark_id == mark_id)
    }

    pub(crate) fn mark_mut(&mut self, mark_id: u64) -> Option<&mut MarkView> {
        self.marks.iter_mut().find(|m| m.mark_id == mark_id)
    }

    /// Currently selected mark.
    pub fn selected_mark(&self) -> Option<&MarkView> {
        self.selected.and_then(|i| self.marks.get(i))
    }

    /// Move the selection forward, wrapping around.
    pub(crate) fn select_next(&mut self) {
        let len = self.marks.len();
        if len == 0 {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| (i + 1) % len));
    }

    /// Move the selection backward, wrapping around.
    pub(crate) fn select_previous(&mut self) {
        let len = self.marks.len();
        if len == 0 {
            return;
        }
        self.selected = Some(self.selected.map_or(len - 1, |i| (i + len - 1) % len));
    }
}

/// Kind of a trace log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// Command received from the compiler.
    Command,
    /// Request sent to the compiler.
    Request,
    /// Received line that produced no domain event.
    Unhandled,
}

/// One line in the trace log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Time since the probe started.
    pub elapsed: Duration,
    /// Entry kind.
    pub kind: TraceKind,
    /// Text as shown in the log.
    pub text: String,
}
