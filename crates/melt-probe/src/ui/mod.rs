//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O).

mod info;
mod source;
mod status;
mod tabs;
pub mod trace;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const TABS_HEIGHT: u16 = 1;
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TABS_HEIGHT),
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [tabs_area, main_area, status_area] = chunks.as_ref() else {
        return;
    };

    tabs::render(frame, app, *tabs_area);
    render_main_area(frame, app, *main_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (source + mark info, trace pane when enabled).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const SOURCE_PERCENT: u16 = 60;
    const TRACE_PERCENT: u16 = 40;

    let source_column = if app.trace_visible() {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(SOURCE_PERCENT),
                Constraint::Percentage(TRACE_PERCENT),
            ])
            .split(area);

        let [source_column, trace_area] = chunks.as_ref() else {
            return;
        };
        trace::render(frame, app, *trace_area);
        *source_column
    } else {
        area
    };

    render_source_column(frame, app, source_column);
}

fn render_source_column(frame: &mut Frame, app: &App, area: Rect) {
    const SOURCE_MIN_HEIGHT: u16 = 3;
    const INFO_HEIGHT: u16 = 6;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(SOURCE_MIN_HEIGHT), Constraint::Length(INFO_HEIGHT)])
        .split(area);

    let [source_area, info_area] = chunks.as_ref() else {
        return;
    };

    source::render(frame, app, *source_area);
    info::render(frame, app, *info_area);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use melt_app::{AppConfig, AppEvent, KeyInput, TraceEntry, TraceKind};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn probe_app(trace_visible: bool) -> App {
        let mut app = App::new(AppConfig { trace_visible, max_trace_entries: 10 });
        let _ = app.handle(AppEvent::FileOpened {
            file_id: 3,
            filename: "/src/a.c".into(),
            content: "int a;\nint b = 2;\nint c;\n".into(),
        });
        let _ = app.handle(AppEvent::MarkPlaced { mark_id: 7, file_id: 3, line: 1, column: 4 });
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::InfoAdded { mark_id: 7, file_id: 3, payload: vec![
            "tree b".into(),
        ] });
        app
    }

    #[test]
    fn empty_app_renders_placeholder() {
        let text = screen(&App::default(), 60, 14);
        assert!(text.contains("Waiting for the compiler"));
    }

    #[test]
    fn source_view_shows_tab_marker_and_info() {
        let text = screen(&probe_app(false), 70, 16);

        assert!(text.contains("[3] a.c"));
        assert!(text.contains("/src/a.c (C/C++)"));
        assert!(text.contains(source::MARKER));
        assert!(text.contains("int b = 2;"));
        assert!(text.contains("Mark 7 at 2:5"));
        assert!(text.contains("tree b"));
        assert!(!text.contains("Trace"));
    }

    #[test]
    fn mark_at_largest_coordinate_renders() {
        let mut app = probe_app(false);
        let _ = app.handle(AppEvent::MarkPlaced {
            mark_id: 9,
            file_id: 3,
            line: u32::MAX,
            column: u32::MAX,
        });
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.selected_mark().map(|m| m.mark_id), Some(9));

        let text = screen(&app, 90, 16);
        assert!(text.contains("Mark 9 at 4294967295:4294967295"));
    }

    #[test]
    fn trace_pane_follows_toggle() {
        let mut app = probe_app(true);
        let _ = app.handle(AppEvent::Traced(TraceEntry {
            elapsed: Duration::from_millis(250),
            kind: TraceKind::Request,
            text: "INFOLOCATION_prq 7".into(),
        }));

        let text = screen(&app, 100, 16);
        assert!(text.contains("Trace"));
        assert!(text.contains(">> INFOLOCATION_prq 7"));
    }
}
