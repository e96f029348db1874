// src/core/aggregator/cms.rs

use regex::Regex;
use tracing::debug;

use crate::core::models::{Evidence, EvidenceCategory, HttpSnapshot};
use crate::core::signatures::CmsSignature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsVerdict {
    pub name: &'static str,
    pub version: Option<String>,
}

/// Tries signatures in declaration order and stops at the first one that matches.
///
/// Unlike CDN scoring there is no accumulation: the first signature to produce a
/// name wins, even if a later one would match more rules.
pub fn detect_cms(signatures: &[CmsSignature], http: &HttpSnapshot, evidence: &mut Vec<Evidence>) -> Option<CmsVerdict> {
    for sig in signatures {
        if let Some(verdict) = match_signature(sig, http, evidence) {
            debug!(cms = verdict.name, version = ?verdict.version, "CMS identified.");
            return Some(verdict);
        }
    }
    None
}

/// Headers, then cookies, then the meta regex, then known paths.
fn match_signature(sig: &CmsSignature, http: &HttpSnapshot, evidence: &mut Vec<Evidence>) -> Option<CmsVerdict> {
    let mut found = |rule: String, version: Option<String>| {
        evidence.push(Evidence::new(EvidenceCategory::Cms, format!("{rule} → {}", sig.name)));
        Some(CmsVerdict { name: sig.name, version })
    };

    for header in sig.headers {
        if let Some(value) = http.header(header) {
            let version = sig.header_version.and_then(|re| first_capture(re, value));
            return found(format!("Header '{header}'"), version);
        }
    }

    let cookies = http.cookies();
    for cookie in sig.cookies {
        if cookies.contains(cookie) {
            return found(format!("Cookie '{cookie}'"), None);
        }
    }

    let body = http.body();
    if let Some(re) = sig.meta {
        if let Some(caps) = re.captures(body) {
            let version = caps.get(1).map(|m| m.as_str().to_string()).filter(|v| !v.is_empty());
            return found("Meta generator".to_string(), version);
        }
    }

    for path in sig.paths {
        if body.contains(path) {
            return found(format!("Path '{path}'"), None);
        }
    }

    None
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signatures::CMS_SIGNATURES;
    use once_cell::sync::Lazy;

    fn page(headers: &[(&str, &str)], body: &str) -> HttpSnapshot {
        HttpSnapshot {
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: Some(body.to_string()),
            verified_tls: true,
            ..Default::default()
        }
    }

    #[test]
    fn wordpress_version_comes_from_meta_generator() {
        let http = page(&[], r#"<head><meta name="generator" content="WordPress 6.5" /></head>"#);
        let mut evidence = Vec::new();
        let verdict = detect_cms(CMS_SIGNATURES, &http, &mut evidence).unwrap();
        assert_eq!(verdict, CmsVerdict { name: "WordPress", version: Some("6.5".into()) });
        assert_eq!(evidence[0].detail, "Meta generator → WordPress");
    }

    #[test]
    fn header_match_applies_version_regex_to_that_header() {
        let http = page(&[("X-Drupal-Cache", "Drupal 10 HIT")], "");
        let verdict = detect_cms(CMS_SIGNATURES, &http, &mut Vec::new()).unwrap();
        assert_eq!(verdict.name, "Drupal");
        assert_eq!(verdict.version.as_deref(), Some("10"));
    }

    #[test]
    fn cookie_match_has_no_version() {
        let http = page(&[("Set-Cookie", "_shopify_y=abc; path=/")], "");
        let verdict = detect_cms(CMS_SIGNATURES, &http, &mut Vec::new()).unwrap();
        assert_eq!(verdict, CmsVerdict { name: "Shopify", version: None });
    }

    #[test]
    fn path_substring_is_the_last_resort() {
        let http = page(&[], r#"<link href="/wp-content/themes/x/style.css">"#);
        let verdict = detect_cms(CMS_SIGNATURES, &http, &mut Vec::new()).unwrap();
        assert_eq!(verdict, CmsVerdict { name: "WordPress", version: None });
    }

    #[test]
    fn first_declared_signature_wins_when_both_match() {
        static RE_NEVER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\b$").unwrap());
        let signatures = [
            CmsSignature { name: "First", headers: &[], header_version: None, cookies: &[], meta: None, paths: &["/shared/"] },
            CmsSignature {
                name: "Second",
                headers: &["x-second"],
                header_version: Some(&RE_NEVER),
                cookies: &[],
                meta: None,
                paths: &["/shared/"],
            },
        ];
        let http = page(&[("X-Second", "1")], "<script src=\"/shared/app.js\">");
        let mut evidence = Vec::new();
        let verdict = detect_cms(&signatures, &http, &mut evidence).unwrap();
        assert_eq!(verdict.name, "First");
        assert_eq!(evidence.len(), 1);
    }

    #[test]
    fn no_match_yields_none() {
        let http = page(&[("Server", "nginx")], "<html><body>plain</body></html>");
        assert!(detect_cms(CMS_SIGNATURES, &http, &mut Vec::new()).is_none());
    }
}
