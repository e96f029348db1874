// src/config.rs

use lazy_static::lazy_static;
use std::time::Duration;
use tracing::warn;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Upper bound on the number of body bytes kept for content detection.
pub const BODY_PREFIX_LIMIT: usize = 50 * 1024;

/// Largest URL the request contract accepts.
pub const MAX_URL_LENGTH: usize = 2048;

/// Probe budgets and client identity for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub http_timeout: Duration,
    pub tls_timeout: Duration,
    /// Per DNS query, including the reverse lookup.
    pub dns_timeout: Duration,
    pub whois_timeout: Duration,
    pub max_redirects: usize,
    pub body_limit: usize,
    pub user_agent: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(10),
            tls_timeout: Duration::from_secs(5),
            dns_timeout: Duration::from_secs(5),
            whois_timeout: Duration::from_secs(10),
            max_redirects: 10,
            body_limit: BODY_PREFIX_LIMIT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults overridden by `<CRATE>_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |suffix: &str, fallback: Duration| {
            let key = format!("{}_{}", PROJECT_NAME.as_str(), suffix);
            match lookup(&key).map(|v| v.trim().parse::<u64>()) {
                Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
                Some(_) => {
                    warn!(key = %key, "Ignoring invalid timeout override.");
                    fallback
                }
                None => fallback,
            }
        };

        Self {
            http_timeout: seconds("HTTP_TIMEOUT_SECS", defaults.http_timeout),
            tls_timeout: seconds("TLS_TIMEOUT_SECS", defaults.tls_timeout),
            dns_timeout: seconds("DNS_TIMEOUT_SECS", defaults.dns_timeout),
            whois_timeout: seconds("WHOIS_TIMEOUT_SECS", defaults.whois_timeout),
            user_agent: lookup(&format!("{}_USER_AGENT", PROJECT_NAME.as_str()))
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_budgets() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.tls_timeout, Duration::from_secs(5));
        assert_eq!(config.body_limit, 51_200);
    }

    #[test]
    fn overrides_are_read_with_crate_prefix() {
        let config = AnalyzerConfig::from_lookup(|key| match key {
            "SITELENS_HTTP_TIMEOUT_SECS" => Some("3".into()),
            "SITELENS_TLS_TIMEOUT_SECS" => Some("not-a-number".into()),
            "SITELENS_USER_AGENT" => Some("probe/1.0".into()),
            _ => None,
        });
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.tls_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "probe/1.0");
    }
}
