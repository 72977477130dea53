//! Trace pane
//!
//! Commands received (`<<`), requests sent (`>>`) and unhandled lines (`??`),
//! newest at the bottom.

use melt_app::{App, TraceEntry, TraceKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// One trace entry as shown in the pane.
pub fn entry_text(entry: &TraceEntry) -> String {
    let direction = match entry.kind {
        TraceKind::Command => "<<",
        TraceKind::Request => ">>",
        TraceKind::Unhandled => "??",
    };
    format!("+{:.3}s {direction} {}", entry.elapsed.as_secs_f64(), entry.text)
}

fn kind_style(kind: TraceKind) -> Style {
    match kind {
        TraceKind::Command => Style::default().fg(Color::Blue),
        TraceKind::Request => Style::default().fg(Color::Red),
        TraceKind::Unhandled => Style::default().fg(Color::Yellow),
    }
}

/// Render the trace pane.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = app.trace().len().saturating_sub(visible_height);

    let items: Vec<ListItem> = app
        .trace()
        .skip(skip)
        .map(|entry| {
            ListItem::new(Line::from(Span::styled(entry_text(entry), kind_style(entry.kind))))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Trace ");
    frame.render_widget(List::new(items).block(block), area);
}
