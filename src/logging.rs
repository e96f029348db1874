// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use std::path::PathBuf;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LOG_ENV, LOG_FILE};

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sitelens", env!("CARGO_PKG_NAME"))
}

/// Where the log file and JSON exports live.
pub fn get_data_dir() -> PathBuf {
    project_directory().map_or_else(|| PathBuf::from(".data"), |dirs| dirs.data_local_dir().to_path_buf())
}

pub fn log_file_path() -> PathBuf {
    get_data_dir().join(LOG_FILE.as_str())
}

/// Sends every `tracing` event to a fresh log file in the data directory.
///
/// The terminal belongs to the TUI, so nothing is written to stdout. The filter
/// comes from `RUST_LOG`, then `<CRATE>_LOGLEVEL`, then `<crate>=info`.
pub fn initialize_logging() -> Result<()> {
    std::fs::create_dir_all(get_data_dir())?;
    let sink = std::fs::File::create(log_file_path())?;
    let directive = filter_directive(|key| std::env::var(key).ok());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .with_timer(LocalTime::new(format_description!("[hour]:[minute]:[second]")))
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(directive));

    tracing_subscriber::registry().with(file_layer).with(ErrorLayer::default()).init();

    Ok(())
}

fn filter_directive(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG")
        .or_else(|| lookup(LOG_ENV.as_str()))
        .unwrap_or_else(|| format!("{}=info", env!("CARGO_CRATE_NAME")))
}
