//! Status bar
//!
//! Displays probe state, counts and the last status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let probe_state = if app.probe_open() {
        Span::styled("Attached", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("Closed", Style::default().fg(Color::Red))
    };

    let mark_count: usize = app.files().iter().map(|f| f.marks().len()).sum();
    let mut counts = format!(" | Files: {} | Marks: {mark_count}", app.files().len());
    let pending = app.pending_mark_count();
    if pending > 0 {
        counts.push_str(&format!(" ({pending} pending)"));
    }

    let message = app.status_message().map(|m| format!(" | {m}")).unwrap_or_default();

    let status_line = Line::from(vec![
        Span::raw(" "),
        probe_state,
        Span::styled(counts, Style::default().fg(Color::White)),
        Span::styled(message, Style::default().fg(Color::White)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
