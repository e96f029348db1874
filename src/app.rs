// src/app.rs

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use ratatui::widgets::{ListState, ScrollbarState};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::error::AnalysisError;
use crate::core::knowledge_base::{self, FindingDetail};
use crate::core::models::{AnalysisResponse, AnalysisResult};
use crate::logging;

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Lines of the log file kept for the log panel.
const LOG_TAIL_LINES: usize = 200;

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub show_disclaimer: bool,
    pub input: String,
    /// Why the last submitted input was rejected before analysis.
    pub input_error: Option<String>,
    pub outcome: Option<Result<AnalysisResult, AnalysisError>>,
    pub findings: Vec<&'static FindingDetail>,
    pub findings_state: ListState,
    /// Security score shown by the gauge; climbs towards the real score on each tick.
    pub displayed_score: u32,
    pub spinner_frame: usize,
    pub show_logs: bool,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
    pub scan_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            show_disclaimer: true,
            input: String::new(),
            input_error: None,
            outcome: None,
            findings: Vec::new(),
            findings_state: ListState::default(),
            displayed_score: 0,
            spinner_frame: 0,
            show_logs: false,
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
            scan_task: None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Stores a finished analysis and derives the findings list from it.
    pub fn finish_scan(&mut self, outcome: Result<AnalysisResult, AnalysisError>) {
        self.findings = match &outcome {
            Ok(result) => knowledge_base::findings_for(result),
            Err(_) => Vec::new(),
        };
        self.findings_state = ListState::default();
        if !self.findings.is_empty() {
            self.findings_state.select(Some(0));
        }
        self.displayed_score = 0;
        self.outcome = Some(outcome);
        self.scan_task = None;
        self.state = AppState::Finished;
    }

    pub fn select_previous(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let index = match self.findings_state.selected() {
            Some(0) | None => self.findings.len() - 1,
            Some(i) => i - 1,
        };
        self.findings_state.select(Some(index));
    }

    pub fn select_next(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let index = match self.findings_state.selected() {
            Some(i) if i + 1 < self.findings.len() => i + 1,
            _ => 0,
        };
        self.findings_state.select(Some(index));
    }

    pub fn scroll_logs_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn scroll_logs_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.refresh_logs();
        }
    }

    /// Reloads the tail of the log file written by the tracing subscriber.
    pub fn refresh_logs(&mut self) {
        if let Ok(content) = fs::read_to_string(logging::log_file_path()) {
            self.log_content = tail(&content, LOG_TAIL_LINES);
        }
    }

    pub fn on_tick(&mut self) {
        match self.state {
            AppState::Scanning => self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len(),
            AppState::Finished => {
                let target = self.result().map_or(0, |r| r.security.score);
                if self.displayed_score < target {
                    self.displayed_score = (self.displayed_score + 2).min(target);
                }
            }
            AppState::Idle => {}
        }
        if self.show_logs {
            self.refresh_logs();
        }
    }

    /// Writes the JSON response for the current outcome into the data directory.
    pub fn export_report(&mut self) {
        let Some(outcome) = self.outcome.clone() else {
            return;
        };
        let domain = match &outcome {
            Ok(result) => result.url.clone(),
            Err(_) => self.input.clone(),
        };
        let path = export_path(&domain);
        let response = AnalysisResponse::from(outcome);

        let written = serde_json::to_string_pretty(&response)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                fs::write(&path, json).map_err(|e| e.to_string())
            });

        self.export_status = match written {
            Ok(()) => {
                info!(path = %path.display(), "Report exported.");
                ExportStatus::Success(path.display().to_string())
            }
            Err(e) => {
                error!(error = %e, "Report export failed.");
                ExportStatus::Error(e)
            }
        };
    }

    pub fn quit(&mut self) {
        self.cancel_scan();
        self.should_quit = true;
    }

    /// Aborting the task drops the analysis future, which cancels every in-flight probe.
    fn cancel_scan(&mut self) {
        if let Some(task) = self.scan_task.take() {
            task.abort();
        }
    }

    pub fn reset(&mut self) {
        self.cancel_scan();
        self.state = AppState::Idle;
        self.input = String::new();
        self.input_error = None;
        self.outcome = None;
        self.findings = Vec::new();
        self.findings_state = ListState::default();
        self.displayed_score = 0;
        self.spinner_frame = 0;
        self.export_status = ExportStatus::Idle;
    }
}

fn tail(content: &str, lines: usize) -> Vec<String> {
    let all: Vec<&str> = content.lines().collect();
    all[all.len().saturating_sub(lines)..].iter().map(|l| l.to_string()).collect()
}

/// `https://www.example.com:8443/x` → `<data dir>/example.com-<stamp>.json`.
fn export_path(target: &str) -> PathBuf {
    let host = target
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split(['/', ':'])
        .next()
        .unwrap_or("report");
    let safe: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    logging::get_data_dir().join(format!("{safe}-{stamp}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), vec!["b", "c"]);
        assert_eq!(tail("a", 5), vec!["a"]);
    }

    #[test]
    fn export_path_uses_bare_host() {
        let path = export_path("https://www.example.com:8443/x");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("example.com-"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn failed_scan_has_no_findings() {
        let mut app = App::new();
        app.finish_scan(Err(AnalysisError::InvalidUrl));
        assert!(app.findings.is_empty());
        assert!(app.findings_state.selected().is_none());
        app.select_next();
        assert!(app.findings_state.selected().is_none());
        assert!(matches!(app.state, AppState::Finished));
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut app = App::new();
        app.input = "example.com".into();
        app.finish_scan(Err(AnalysisError::InvalidUrl));
        app.reset();
        assert!(matches!(app.state, AppState::Idle));
        assert!(app.input.is_empty());
        assert!(app.outcome.is_none());
    }
}
