// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub overview: Rect,
    pub findings: Rect,
    pub summary: Rect,
    pub footer: Rect,
    /// Empty when the log panel is hidden.
    pub log_panel: Rect,
}

/// Input on top, footer at the bottom, and in between the report column
/// (detection overview above the findings list), the summary column and, when
/// toggled on, the log tail.
pub fn create_layout(frame_size: Rect, show_logs: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame_size);

    let content_constraints = if show_logs {
        vec![Constraint::Percentage(45), Constraint::Percentage(25), Constraint::Percentage(30)]
    } else {
        vec![Constraint::Percentage(65), Constraint::Percentage(35)]
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(content_constraints)
        .split(main_chunks[1]);

    let report_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(content_chunks[0]);

    AppLayout {
        input: main_chunks[0],
        overview: report_chunks[0],
        findings: report_chunks[1],
        summary: content_chunks[1],
        log_panel: if show_logs { content_chunks[2] } else { Rect::default() },
        footer: main_chunks[2],
    }
}
