// src/core/error.rs

use thiserror::Error;

/// Why a single probe produced no payload.
///
/// Probes never raise: every failure mode is one of these tags, so the
/// aggregator and the assembler can match on "absent" instead of unwinding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("host unreachable")]
    Unreachable,
    #[error("timed out")]
    Timeout,
    #[error("no such domain")]
    NoSuchDomain,
    #[error("too many redirects")]
    RedirectLoop,
    #[error("{0}")]
    Protocol(String),
    #[error("no data")]
    NoData,
}

impl ProbeFailure {
    /// `true` for the "nothing there" outcomes that are expected on healthy domains.
    pub fn is_absence(&self) -> bool {
        matches!(self, ProbeFailure::NoData | ProbeFailure::NoSuchDomain)
    }
}

/// Fatal errors: the only outcomes that stop an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Invalid URL format")]
    InvalidUrl,
    #[error("Domain \"{0}\" does not exist or cannot be resolved.")]
    UnresolvableDomain(String),
    #[error("Could not connect to \"{0}\". The server is down or refusing connections.")]
    Unreachable(String),
    #[error("Request to \"{domain}\" timed out after {seconds} seconds.")]
    Timeout { domain: String, seconds: u64 },
    #[error("Too many redirects while fetching \"{0}\". The site may be stuck in a redirect loop.")]
    RedirectLoop(String),
    #[error("Failed to fetch \"{domain}\": {reason}.")]
    FetchFailed { domain: String, reason: String },
}

/// Rejections of the inbound request, raised before the engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("URL required")]
    UrlRequired,
    #[error("URL too long")]
    UrlTooLong,
    #[error("Request body must be JSON with a \"url\" field")]
    MalformedBody,
}
