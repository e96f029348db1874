// src/ui/widgets/overview.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::models::AnalysisResult;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Detection results: CDN, CMS, hosting, technologies, evidence and warnings.
pub fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Detection");

    let content = match (&app.state, &app.outcome) {
        (AppState::Idle, _) => Paragraph::new("Enter a URL and press Enter. Results will appear here.")
            .alignment(Alignment::Center),
        (AppState::Scanning, _) => Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
            Span::raw("Probing HTTP, DNS, TLS and WHOIS..."),
        ]))
        .alignment(Alignment::Center),
        (AppState::Finished, Some(Err(error))) => Paragraph::new(vec![
            Line::from(""),
            Line::from("ANALYSIS FAILED".bold().red()),
            Line::from(""),
            Line::from(error.to_string()),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        (AppState::Finished, Some(Ok(result))) => Paragraph::new(detection_lines(result)).wrap(Wrap { trim: false }),
        (AppState::Finished, None) => Paragraph::new(""),
    };

    frame.render_widget(content.block(block), area);
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![Span::styled(format!("{label:<11}"), Style::default().fg(Color::DarkGray)), Span::raw(value)])
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() { "-".to_string() } else { items.join(", ") }
}

fn detection_lines(result: &AnalysisResult) -> Vec<Line<'_>> {
    let cdn_style = if result.confidence > 0 { Style::default().fg(Color::Cyan).bold() } else { Style::default() };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<11}", "CDN"), Style::default().fg(Color::DarkGray)),
            Span::styled(result.cdn_detected.as_str(), cdn_style),
            Span::raw(format!("  ({}% confidence)", result.confidence)),
        ]),
        field(
            "CMS",
            match (&result.cms, &result.cms_version) {
                (Some(cms), Some(version)) => format!("{cms} {version}"),
                (Some(cms), None) => cms.clone(),
                (None, _) => "Not detected".to_string(),
            },
        ),
        field("Hosting", format!("{} ({})", result.hosting_provider, result.ip_address)),
        field("Server", result.server.clone().unwrap_or_else(|| "-".to_string())),
        field("Language", list_or_dash(&result.language)),
        field("Frameworks", list_or_dash(&result.frameworks)),
        field("Analytics", list_or_dash(&result.analytics)),
        field("CNAMEs", list_or_dash(&result.cnames)),
        Line::from(""),
        Line::from("EVIDENCE".bold()),
    ];

    if result.evidence.is_empty() {
        lines.push(Line::from("No CDN, CMS or hosting signatures matched.".dark_gray()));
    }
    for evidence in &result.evidence {
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", evidence.category), Style::default().fg(Color::DarkGray)),
            Span::raw(evidence.detail.as_str()),
        ]));
    }

    if !result.warnings.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("WARNINGS".bold().yellow()));
        for warning in &result.warnings {
            lines.push(Line::from(Span::styled(format!("! {warning}"), Style::default().fg(Color::Yellow))));
        }
    }
    lines
}
