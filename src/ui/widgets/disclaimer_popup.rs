// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    layout::Flex,
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Modal notice shown once at start-up, drawn over a cleared area.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let disclaimer_text = Text::from(vec![
        Line::from("BEFORE YOU START".bold().yellow()),
        Line::from(""),
        Line::from(format!(
            "{} fingerprints public websites: it sends ordinary HTTP requests, opens a TLS connection, and queries DNS and WHOIS.",
            env!("CARGO_PKG_NAME")
        )),
        Line::from(""),
        Line::from("Detections are heuristic. A missing header or an unknown CDN is a hint, not proof, and results can be wrong when a site hides or spoofs its signatures."),
        Line::from(""),
        Line::from("Public WHOIS servers rate-limit heavy use. Analyse sites you have a reason to look at, and respect their terms of service."),
        Line::from(""),
        Line::from("Press ".bold() + "Enter".bold().yellow() + " to continue or ".bold() + "Esc".bold().yellow() + " to quit".bold()),
    ]);

    let block = Block::default()
        .title("Notice")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let popup_area = centered_rect(60, 50, area);

    let popup = Paragraph::new(disclaimer_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// A rectangle of the given percentages, centered in `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center).areas(r);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center).areas(row);
    popup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered() {
        let popup = centered_rect(60, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 10);
    }
}
