// src/main.rs

use clap::Parser;
use color_eyre::config::HookBuilder;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod app;
mod args;
mod config;
mod core;
mod logging;
mod ui;

use app::{App, AppState};
use args::Args;
use config::AnalyzerConfig;
use core::error::{AnalysisError, RequestError};
use core::models::{AnalysisResponse, AnalysisResult};
use core::request::AnalysisRequest;

type ScanOutcome = Result<AnalysisResult, AnalysisError>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    install_hooks()?;
    logging::initialize_logging()?;
    let config = AnalyzerConfig::from_env();
    info!(?config, "Starting {}.", env!("CARGO_PKG_NAME"));

    if let Some(request) = args.headless_request() {
        return run_headless(request, &config, args.pretty).await;
    }

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel::<ScanOutcome>(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &config)?;
        }

        // A cancelled scan may still have delivered its outcome; drop it.
        if let Ok(outcome) = rx.try_recv() {
            if matches!(app.state, AppState::Scanning) {
                app.finish_scan(outcome);
            }
        }
        app.on_tick();
    }

    restore_terminal()?;
    info!("Shutting down.");
    Ok(())
}

/// One analysis, JSON on stdout. Request rejections use the same `{ "error" }` shape.
async fn run_headless(
    request: Result<AnalysisRequest, RequestError>,
    config: &AnalyzerConfig,
    pretty: bool,
) -> Result<()> {
    let response = match request.and_then(|r| r.validate().map(str::to_string)) {
        Ok(url) => AnalysisResponse::from(core::analyze(&url, config).await),
        Err(e) => {
            warn!(error = %e, "Request rejected.");
            AnalysisResponse::Failure { error: e.to_string() }
        }
    };
    let json = if pretty { serde_json::to_string_pretty(&response)? } else { serde_json::to_string(&response)? };
    println!("{json}");
    Ok(())
}

/// color-eyre reports, with the terminal restored first so a panic stays readable.
fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        panic_hook(panic_info);
    }));
    Ok(())
}

fn restore_terminal() -> Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

fn handle_events(app: &mut App, tx: &mpsc::Sender<ScanOutcome>, config: &AnalyzerConfig) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            app.quit();
            return Ok(());
        }
        if app.show_disclaimer {
            match key.code {
                KeyCode::Enter => app.show_disclaimer = false,
                KeyCode::Esc => app.quit(),
                _ => {}
            }
            return Ok(());
        }
        if key.code == KeyCode::Tab {
            app.toggle_logs();
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, tx, config),
            AppState::Finished => handle_finished_input(app, key.code),
            AppState::Scanning => match key.code {
                KeyCode::Esc => app.reset(),
                KeyCode::Char('q') => app.quit(),
                _ => {}
            },
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, tx: &mpsc::Sender<ScanOutcome>, config: &AnalyzerConfig) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => {
            app.input.push(c);
            app.input_error = None;
        }
        KeyCode::Backspace => {
            app.input.pop();
            app.input_error = None;
        }
        KeyCode::Enter => {
            let request = AnalysisRequest::new(app.input.clone());
            let url = match request.validate() {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!(error = %e, "Request rejected.");
                    app.input_error = Some(e.to_string());
                    return;
                }
            };

            app.state = AppState::Scanning;
            let tx = tx.clone();
            let config = config.clone();
            app.scan_task = Some(tokio::spawn(async move {
                let outcome = core::analyze(&url, &config).await;
                let _ = tx.send(outcome).await;
            }));
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.export_report(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left => app.scroll_logs_left(),
        KeyCode::Right => app.scroll_logs_right(),
        _ => {}
    }
}
