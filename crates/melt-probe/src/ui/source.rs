//! Source view
//!
//! Shows the active file with line numbers, an arrow on lines carrying marks
//! and a boxed cell at each mark's column. The selected mark's line is
//! highlighted and kept in view.

use melt_app::{App, FileView};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Gutter marker for lines with marks.
pub const MARKER: &str = "▶";

const BORDER_SIZE: u16 = 2;
const LINE_NUMBER_WIDTH: usize = 5;

/// Render the source view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(file) = app.active_file() else {
        let block = Block::default().borders(Borders::ALL).title(" Source ");
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "Waiting for the compiler to show a file",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let title = format!(" {} ({}) ", file.filename, file.lexer.name());
    let block = Block::default().borders(Borders::ALL).title(title);

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let selected = file.selected_mark().map(|m| m.line as usize);
    let skip = selected.map_or(0, |line| line.saturating_sub(visible_height / 2));

    let lines: Vec<Line> = file
        .lines
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible_height)
        .map(|(index, text)| source_line(file, index, text, selected == Some(index)))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn source_line<'a>(file: &FileView, index: usize, text: &'a str, selected: bool) -> Line<'a> {
    let line_no = u32::try_from(index).unwrap_or(u32::MAX);
    let mut columns: Vec<usize> = file.marks_on_line(line_no).map(|m| m.column as usize).collect();
    columns.sort_unstable();
    columns.dedup();

    let gutter = Span::styled(
        format!("{:>LINE_NUMBER_WIDTH$} ", index + 1),
        Style::default().fg(Color::DarkGray),
    );
    let marker = if columns.is_empty() {
        Span::raw(" ")
    } else {
        Span::styled(MARKER, Style::default().fg(Color::Red))
    };

    let mut spans = vec![gutter, marker, Span::raw(" ")];
    spans.extend(indicator_spans(text, &columns));

    let line = Line::from(spans);
    if selected { line.style(Style::default().bg(Color::Rgb(0x40, 0x20, 0x20))) } else { line }
}

/// Split `text` so each marked column is its own highlighted span.
fn indicator_spans<'a>(text: &'a str, columns: &[usize]) -> Vec<Span<'a>> {
    let indicator = Style::default().add_modifier(Modifier::REVERSED);
    let mut spans = Vec::new();
    let mut start = 0;

    for (column, (offset, ch)) in text.char_indices().enumerate() {
        if columns.binary_search(&column).is_err() {
            continue;
        }
        let end = offset + ch.len_utf8();
        if start < offset {
            spans.push(Span::raw(text.get(start..offset).unwrap_or_default()));
        }
        spans.push(Span::styled(text.get(offset..end).unwrap_or_default(), indicator));
        start = end;
    }
    if start < text.len() {
        spans.push(Span::raw(text.get(start..).unwrap_or_default()));
    }
    spans
}
