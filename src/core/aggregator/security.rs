// src/core/aggregator/security.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::models::{Grade, HeaderStatus, HttpSnapshot, SecurityReport};
use crate::core::signatures::SECURITY_HEADERS;

/// Credits each graded header's full points when present, whatever its value.
pub fn grade_security(http: &HttpSnapshot) -> SecurityReport {
    let mut score = 0;
    let mut max_score = 0;
    let mut headers = BTreeMap::new();

    for header in SECURITY_HEADERS {
        max_score += header.points;
        let status = if http.has_header(header.name) {
            score += header.points;
            HeaderStatus::Present
        } else {
            HeaderStatus::Missing
        };
        headers.insert(header.name.to_string(), status);
    }

    let grade = grade_for(score);
    debug!(score, %grade, "Security headers graded.");
    SecurityReport { score, max_score, grade, headers }
}

pub fn grade_for(score: u32) -> Grade {
    match score {
        90.. => Grade::APlus,
        80..=89 => Grade::A,
        70..=79 => Grade::B,
        60..=69 => Grade::C,
        50..=59 => Grade::D,
        _ => Grade::F,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_headers(names: &[&str]) -> HttpSnapshot {
        HttpSnapshot {
            headers: names.iter().map(|n| (n.to_string(), "x".to_string())).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn all_seven_headers_score_a_plus() {
        let report = grade_security(&with_headers(&[
            "strict-transport-security",
            "Content-Security-Policy",
            "X-Frame-Options",
            "x-content-type-options",
            "X-XSS-Protection",
            "Referrer-Policy",
            "PERMISSIONS-POLICY",
        ]));
        assert_eq!(report.score, 100);
        assert_eq!(report.max_score, 100);
        assert_eq!(report.grade, Grade::APlus);
        assert!(report.headers.values().all(|s| *s == HeaderStatus::Present));
    }

    #[test]
    fn no_headers_scores_f() {
        let report = grade_security(&with_headers(&["Server"]));
        assert_eq!(report.score, 0);
        assert_eq!(report.grade, Grade::F);
        assert_eq!(report.headers["Strict-Transport-Security"], HeaderStatus::Missing);
    }

    #[test]
    fn hsts_and_csp_alone_stay_below_d() {
        let report = grade_security(&with_headers(&["Strict-Transport-Security", "Content-Security-Policy"]));
        assert_eq!(report.score, 40);
        assert_eq!(report.grade, Grade::F);
    }

    #[test]
    fn thresholds_map_to_letters() {
        assert_eq!(grade_for(90), Grade::APlus);
        assert_eq!(grade_for(89), Grade::A);
        assert_eq!(grade_for(80), Grade::A);
        assert_eq!(grade_for(70), Grade::B);
        assert_eq!(grade_for(65), Grade::C);
        assert_eq!(grade_for(50), Grade::D);
        assert_eq!(grade_for(49), Grade::F);
    }
}
