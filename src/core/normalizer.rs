// src/core/normalizer.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::core::error::AnalysisError;
use crate::core::models::Target;

/// Scheme, dot-separated labels (1–63 chars, no edge hyphens), optional port, optional path.
static RE_TARGET_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?::\d{1,5})?(?:/\S*)?$",
    )
    .unwrap()
});

/// Turns user input into a validated [`Target`].
///
/// Whitespace and trailing slashes are removed and `https://` is prepended when
/// no scheme is given. Anything that then fails the domain grammar is rejected
/// with [`AnalysisError::InvalidUrl`].
pub fn normalize(raw: &str) -> Result<Target, AnalysisError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if !RE_TARGET_URL.is_match(&url) {
        debug!(input = raw, "Rejected input that does not match the URL grammar.");
        return Err(AnalysisError::InvalidUrl);
    }

    let domain = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .ok_or(AnalysisError::InvalidUrl)?;

    Ok(Target {
        raw: raw.to_string(),
        alternate_domain: toggle_www(&domain),
        url,
        domain,
    })
}

/// `www.` added when absent, stripped when present.
pub fn toggle_www(domain: &str) -> String {
    match domain.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{domain}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_https_when_scheme_missing() {
        let target = normalize("example.com").unwrap();
        assert_eq!(target.url, "https://example.com");
        assert_eq!(target.domain, "example.com");
        assert_eq!(target.alternate_domain, "www.example.com");
    }

    #[test]
    fn strips_whitespace_trailing_slash_port_and_path() {
        let target = normalize("  http://WWW.Example.com:8080/blog/  ").unwrap();
        assert_eq!(target.url, "http://WWW.Example.com:8080/blog");
        assert_eq!(target.domain, "www.example.com");
        assert_eq!(target.alternate_domain, "example.com");
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["not a domain!!", "", "   ", "http://-bad-.com", "https://", "exa_mple.com", "a..b"] {
            assert_eq!(normalize(input), Err(AnalysisError::InvalidUrl), "input {input:?}");
        }
    }

    #[test]
    fn rejects_labels_longer_than_63_characters() {
        let long = format!("{}.com", "a".repeat(64));
        assert_eq!(normalize(&long), Err(AnalysisError::InvalidUrl));
        let max = format!("{}.com", "a".repeat(63));
        assert!(normalize(&max).is_ok());
    }

    #[test]
    fn accepts_internal_hyphens() {
        assert_eq!(normalize("my-site.co.uk").unwrap().domain, "my-site.co.uk");
    }
}
