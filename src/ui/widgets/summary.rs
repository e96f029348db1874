// src/ui/widgets/summary.rs

use crate::app::App;
use crate::core::models::{AnalysisResult, CertificateStatus, Grade, HeaderStatus};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Security grade with an animated gauge, then the header checklist and the
/// TLS, domain, email and performance facts.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let Some(result) = app.result() else {
        return;
    };

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Grade
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(8), // Header checklist
            Constraint::Min(0),    // TLS, domain, email, performance
        ])
        .split(area);

    let grade_style = Style::default().fg(grade_color(result.security.grade)).bold();
    let grade_text = Text::from(vec![
        Line::from("Security Grade".bold()),
        Line::from(vec![
            Span::styled(result.security.grade.to_string(), grade_style),
            Span::raw(format!("  {}/{}", result.security.score, result.security.max_score)),
        ]),
    ]);
    frame.render_widget(Paragraph::new(grade_text).alignment(Alignment::Center), summary_chunks[0]);

    let gauge = Gauge::default()
        .percent(app.displayed_score.min(100) as u16)
        .label("")
        .style(Style::default().fg(grade_color(result.security.grade)));
    frame.render_widget(gauge, summary_chunks[1]);

    let mut header_lines = vec![Line::from("SECURITY HEADERS".bold())];
    for (name, status) in &result.security.headers {
        let (icon, style) = match status {
            HeaderStatus::Present => ("✓", Style::default().fg(Color::Green)),
            HeaderStatus::Missing => ("✗", Style::default().fg(Color::Red)),
        };
        header_lines.push(Line::from(vec![Span::styled(format!("{icon} "), style), Span::raw(name.as_str())]));
    }
    frame.render_widget(Paragraph::new(header_lines), summary_chunks[3]);

    frame.render_widget(Paragraph::new(fact_lines(result)).wrap(Wrap { trim: true }), summary_chunks[4]);
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::APlus | Grade::A => Color::Green,
        Grade::B | Grade::C => Color::Yellow,
        Grade::D | Grade::F => Color::Red,
    }
}

fn fact_lines(result: &AnalysisResult) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from("TLS".bold())];
    match &result.ssl {
        Some(ssl) => {
            let status_color = match ssl.status {
                CertificateStatus::Valid => Color::Green,
                CertificateStatus::ExpiringSoon => Color::Yellow,
                CertificateStatus::Expired => Color::Red,
            };
            lines.push(Line::from(vec![
                Span::styled(ssl.status.to_string(), Style::default().fg(status_color)),
                Span::raw(format!(" · {} · {} days left", ssl.tls_version, ssl.days_remaining)),
            ]));
            lines.push(Line::from(format!("{} (issued by {})", ssl.subject, ssl.issuer)));
            lines.push(Line::from(format!("Valid until {}", ssl.valid_until)));
        }
        None => lines.push(Line::from("Unavailable".dark_gray())),
    }

    lines.push(Line::from(""));
    lines.push(Line::from("DOMAIN".bold()));
    match &result.domain_info {
        Some(info) => {
            lines.push(Line::from(format!("Registered {} ({} years, {} days)", info.created, info.age_years, info.age_days)));
            if let Some(expires) = &info.expires {
                lines.push(Line::from(format!("Expires {expires}")));
            }
            if let Some(registrar) = &info.registrar {
                lines.push(Line::from(format!("Registrar: {registrar}")));
            }
        }
        None => lines.push(Line::from("WHOIS data unavailable".dark_gray())),
    }

    lines.push(Line::from(""));
    lines.push(Line::from("EMAIL".bold()));
    let email = &result.email_security;
    lines.push(Line::from(format!("SPF: {} · DMARC: {}", email.spf, email.dmarc)));
    lines.push(Line::from(match email.mx.first() {
        Some(primary) => format!("MX: {primary} (+{} more)", email.mx.len() - 1),
        None => "MX: none".to_string(),
    }));

    lines.push(Line::from(""));
    lines.push(Line::from("PERFORMANCE".bold()));
    let perf = &result.performance;
    let size = perf.page_size_kb.map_or("size unknown".to_string(), |kb| format!("{kb:.2} KB"));
    lines.push(Line::from(format!("{} ms · {} · {size}", perf.response_time_ms, perf.compression)));
    lines
}
