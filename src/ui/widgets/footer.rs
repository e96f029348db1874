// src/ui/widgets/footer.rs

use crate::app::{App, AppState, ExportStatus};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Available actions for the current state, or the outcome of the last export.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match (&app.state, &app.export_status) {
        (AppState::Finished, ExportStatus::Success(path)) => {
            Line::from(vec![Span::styled("Exported to ", Style::new().fg(Color::Green)), Span::raw(path.as_str())])
        }
        (AppState::Finished, ExportStatus::Error(e)) => {
            Line::from(Span::styled(format!("Export failed: {e}"), Style::new().fg(Color::Red)))
        }
        (AppState::Idle, _) => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to analyse, "),
            key("Tab"),
            Span::raw(" for logs, "),
            key("Esc"),
            Span::raw(" to quit."),
        ]),
        (AppState::Finished, ExportStatus::Idle) => Line::from(vec![
            key("[N]"),
            Span::raw("ew analysis, "),
            key("[E]"),
            Span::raw("xport JSON, "),
            key("[Tab]"),
            Span::raw(" logs, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
        (AppState::Scanning, _) => Line::from(vec![
            Span::raw("Analysing... "),
            key("Esc"),
            Span::raw(" to cancel, "),
            key("Q"),
            Span::raw(" to quit."),
        ]),
    };

    let footer = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
