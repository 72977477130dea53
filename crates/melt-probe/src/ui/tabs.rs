//! File tabs
//!
//! One tab per shown file, labelled `[<file_id>] <basename>`.

use melt_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Tabs,
};

/// Render the tab bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app.files().iter().map(|f| Line::from(f.label())).collect();

    let tabs = Tabs::new(titles)
        .select(app.active_index().unwrap_or(0))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}
