// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState};
use crate::core::knowledge_base::FindingCategory;
use crate::core::models::Severity;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default().borders(Borders::ALL).title("Findings (Navigate with ↑ ↓)");

    if !matches!(app.state, AppState::Finished) || app.result().is_none() {
        frame.render_widget(main_block, area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = app
        .findings
        .iter()
        .map(|detail| {
            let category_prefix = match detail.category {
                FindingCategory::Headers => "[HEADERS] ",
                FindingCategory::Tls => "[TLS] ",
                FindingCategory::Email => "[EMAIL] ",
                FindingCategory::Domain => "[DOMAIN] ",
            };
            let title_style = match detail.severity {
                Severity::Critical => Style::default().fg(Color::Red),
                Severity::Warning => Style::default().fg(Color::Yellow),
                Severity::Info => Style::default().fg(Color::Cyan),
            };
            ListItem::new(Line::from(vec![
                Span::styled(category_prefix, Style::default().fg(Color::DarkGray)),
                Span::styled(detail.title, title_style),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.findings_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app.findings_state.selected().and_then(|i| app.findings.get(i));
    let text = match selected {
        Some(detail) => Text::from(vec![
            Line::from(format!("{} · {:?}", detail.category, detail.severity).dark_gray()),
            Line::from(""),
            Line::from("WHAT IT MEANS:".yellow().bold()),
            Line::from(detail.description),
            Line::from(""),
            Line::from("HOW TO FIX:".yellow().bold()),
            Line::from(detail.remediation),
        ]),
        None => Text::from(vec![
            Line::from(""),
            Line::from("✓ NOTHING TO REPORT".bold().fg(Color::Green)),
            Line::from(""),
            Line::from("Every graded header is present and the certificate and email records look healthy."),
        ])
        .centered(),
    };
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block), chunks[1]);
}
