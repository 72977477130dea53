//! Mark information
//!
//! Shows what the compiler sent for the selected mark.

use melt_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the info pane.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (title, lines) = match app.selected_mark() {
        Some(mark) => {
            let (line, column) = (mark.line.saturating_add(1), mark.column.saturating_add(1));
            let title = format!(" Mark {} at {line}:{column} ", mark.mark_id);
            let lines: Vec<Line> = if mark.info.is_empty() {
                let hint = if mark.info_started { "Waiting for information" } else { "Enter: ask" };
                vec![Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))]
            } else {
                mark.info.iter().map(|entry| Line::from(entry.as_str())).collect()
            };
            (title, lines)
        },
        None => (" Info ".to_string(), vec![Line::from(Span::styled(
            "Up/Down: select a mark",
            Style::default().fg(Color::DarkGray),
        ))]),
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
