// src/core/aggregator/technology.rs

use scraper::{Html, Selector};
use tracing::debug;

use crate::core::models::HttpSnapshot;
use crate::core::signatures::{Check, TechCategory, TechnologySignature};

/// Technologies found in the headers and HTML prefix, grouped for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnologyProfile {
    pub server: Option<String>,
    pub language: Vec<String>,
    pub frameworks: Vec<String>,
    pub analytics: Vec<String>,
}

/// Applies every rule; any match is reported and frameworks may co-occur.
pub fn detect_technologies(signatures: &[TechnologySignature], http: &HttpSnapshot) -> TechnologyProfile {
    let body = http.body();
    let cookies = http.cookies();
    let script_sources = script_sources(body);

    let mut profile = TechnologyProfile {
        server: http.header("server").map(str::to_string).filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };

    for rule in signatures {
        let matched = match &rule.check {
            Check::Header(name, re) => http.header(name).is_some_and(|value| re.is_match(value)),
            Check::Html(re) => re.is_match(body),
            Check::Cookie(needle) => cookies.contains(needle),
            Check::ScriptSrc(re) => script_sources.iter().any(|src| re.is_match(src)),
        };
        if !matched {
            continue;
        }

        let bucket = match rule.category {
            TechCategory::Language => &mut profile.language,
            TechCategory::Framework => &mut profile.frameworks,
            TechCategory::Analytics => &mut profile.analytics,
        };
        if !bucket.iter().any(|known| known == rule.name) {
            debug!(tech = rule.name, "Technology rule matched.");
            bucket.push(rule.name.to_string());
        }
    }

    profile
}

/// `src` attributes of every `<script>` in the (possibly truncated) HTML.
fn script_sources(body: &str) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }
    let Ok(selector) = Selector::parse("script[src]") else {
        return Vec::new();
    };
    let document = Html::parse_document(body);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signatures::TECHNOLOGY_SIGNATURES;

    fn page(headers: &[(&str, &str)], body: &str) -> HttpSnapshot {
        HttpSnapshot {
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn frameworks_can_co_occur() {
        let http = page(
            &[],
            r#"<html><body><div data-reactroot></div><app-root ng-version="17.0.1"></app-root>
               <script src="/js/jquery-3.7.1.min.js"></script></body></html>"#,
        );
        let profile = detect_technologies(TECHNOLOGY_SIGNATURES, &http);
        assert_eq!(profile.frameworks, vec!["React", "Angular", "jQuery"]);
    }

    #[test]
    fn languages_and_server_come_from_headers() {
        let http = page(
            &[("Server", "Apache/2.4.58"), ("X-Powered-By", "PHP/8.2.1"), ("Set-Cookie", "PHPSESSID=1")],
            "",
        );
        let profile = detect_technologies(TECHNOLOGY_SIGNATURES, &http);
        assert_eq!(profile.server.as_deref(), Some("Apache/2.4.58"));
        assert_eq!(profile.language, vec!["PHP"]);
    }

    #[test]
    fn analytics_detected_from_script_tags() {
        let http = page(
            &[],
            r#"<script async src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>
               <script defer src="https://plausible.io/js/script.js"></script>"#,
        );
        let profile = detect_technologies(TECHNOLOGY_SIGNATURES, &http);
        assert_eq!(profile.analytics, vec!["Google Analytics", "Plausible"]);
    }

    #[test]
    fn empty_page_yields_empty_profile() {
        let profile = detect_technologies(TECHNOLOGY_SIGNATURES, &HttpSnapshot::default());
        assert_eq!(profile, TechnologyProfile::default());
    }
}
