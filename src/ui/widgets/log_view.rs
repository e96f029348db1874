// src/ui/widgets/log_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

/// Tail of the log file, newest lines at the bottom, with horizontal scrolling.
pub fn render_log_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().title("Logs (scroll with ← →)").borders(Borders::ALL);
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let max_width = app.log_content.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    app.log_horizontal_scroll_state = app.log_horizontal_scroll_state.content_length(max_width);

    // Only as many lines as fit, keeping one row for the scrollbar.
    let visible = inner_area.height.saturating_sub(1) as usize;
    let start = app.log_content.len().saturating_sub(visible);
    let log_lines: Vec<Line> = app.log_content[start..].iter().map(|line| style_log_line(line)).collect();

    let log_paragraph = Paragraph::new(log_lines).scroll((0, app.log_horizontal_scroll as u16));
    frame.render_widget(log_paragraph, inner_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::HorizontalBottom).thumb_symbol("■");
    let scrollbar_area = Rect {
        x: inner_area.x,
        y: inner_area.y + inner_area.height.saturating_sub(1),
        width: inner_area.width,
        height: 1,
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut app.log_horizontal_scroll_state);
}

/// `HH:MM:SS  LEVEL message`: timestamp dimmed, level colored.
fn style_log_line(line: &str) -> Line<'_> {
    let mut parts = line.splitn(2, ' ');
    let (Some(time), Some(rest)) = (parts.next(), parts.next()) else {
        return Line::from(line);
    };
    let rest = rest.trim_start();
    let (level, message) = rest.split_once(' ').unwrap_or((rest, ""));
    let level_style = match level {
        "ERROR" => Style::default().fg(Color::Red),
        "WARN" => Style::default().fg(Color::Yellow),
        "INFO" => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::Blue),
    };
    Line::from(vec![
        Span::styled(time, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(level, level_style),
        Span::raw(" "),
        Span::raw(message),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_is_split_into_time_level_and_message() {
        let line = style_log_line("12:30:01  WARN TLS information unavailable.");
        assert_eq!(line.spans[0].content, "12:30:01");
        assert_eq!(line.spans[2].content, "WARN");
        assert_eq!(line.spans[4].content, "TLS information unavailable.");
    }

    #[test]
    fn unstructured_lines_are_kept_verbatim() {
        let line = style_log_line("plain");
        assert_eq!(line.spans.len(), 1);
    }
}
