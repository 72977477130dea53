//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries so key handling can be
/// driven from tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (request info for the selected mark).
    Enter,
    /// Tab key (next file).
    Tab,
    /// Shift-Tab (previous file).
    BackTab,
    /// Escape key (quit).
    Esc,
    /// Up arrow key (previous mark).
    Up,
    /// Down arrow key (next mark).
    Down,
}
