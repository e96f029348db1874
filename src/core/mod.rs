// src/core/mod.rs

//! The analysis engine: normalize, probe, classify, assemble.

pub mod aggregator;
pub mod assembler;
pub mod error;

/// Static explanations for the findings the TUI lists.
pub mod knowledge_base;

pub mod models;
pub mod normalizer;
pub mod probes;
pub mod request;

/// Read-only CDN, CMS, technology and hosting tables.
pub mod signatures;

use chrono::Utc;
use tracing::{info, instrument};

use crate::config::AnalyzerConfig;
use self::error::AnalysisError;
use self::models::AnalysisResult;

/// Analyses one site end to end.
///
/// Only an invalid URL, an unresolvable domain or a failed HTTP fetch return an
/// error; every other probe failure degrades the result instead.
#[instrument(skip(config))]
pub async fn analyze(raw_url: &str, config: &AnalyzerConfig) -> Result<AnalysisResult, AnalysisError> {
    let target = normalizer::normalize(raw_url)?;
    info!(domain = %target.domain, url = %target.url, "Target normalized.");

    let outcomes = probes::run_probe_set(&target, config).await?;
    Ok(assembler::assemble(outcomes, Utc::now()))
}
