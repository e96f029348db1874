//! Static explanations for every condition the TUI flags on a finished analysis.
//!
//! The engine only reports facts (a header is missing, a certificate expires in
//! twelve days); this table turns those facts into titled findings with a
//! severity and a suggested fix.

use std::fmt;

use crate::core::assembler::FOUND;
use crate::core::models::{AnalysisResult, CertificateStatus, EvidenceCategory, HeaderStatus, Severity};

/// Groups findings in the detail pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    Headers,
    Tls,
    Email,
    Domain,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Headers => write!(f, "Security Headers"),
            FindingCategory::Tls => write!(f, "TLS Certificate"),
            FindingCategory::Email => write!(f, "Email Security"),
            FindingCategory::Domain => write!(f, "Domain Registration"),
        }
    }
}

/// One entry of the knowledge base.
pub struct FindingDetail {
    /// Stable identifier, e.g. `HEADERS_CSP_MISSING`.
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    pub description: &'static str,
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- Security headers ---
    FindingDetail {
        code: "HEADERS_HSTS_MISSING",
        title: "Strict-Transport-Security not sent",
        category: FindingCategory::Headers,
        severity: Severity::Warning,
        description: "Without HSTS a browser may still try plain HTTP first, leaving the first request open to downgrade and cookie theft on hostile networks.",
        remediation: "Send 'Strict-Transport-Security: max-age=31536000; includeSubDomains' on every HTTPS response once the whole site works over HTTPS.",
    },
    FindingDetail {
        code: "HEADERS_CSP_MISSING",
        title: "Content-Security-Policy not sent",
        category: FindingCategory::Headers,
        severity: Severity::Warning,
        description: "A CSP limits where scripts, styles and frames may load from. Without one, any injected markup runs with the page's full privileges.",
        remediation: "Start with a report-only policy listing the origins the site really uses, then enforce it.",
    },
    FindingDetail {
        code: "HEADERS_X_FRAME_OPTIONS_MISSING",
        title: "X-Frame-Options not sent",
        category: FindingCategory::Headers,
        severity: Severity::Warning,
        description: "Other sites can embed these pages in an invisible frame and trick visitors into clicking on them.",
        remediation: "Send 'X-Frame-Options: DENY' or 'SAMEORIGIN', or the equivalent CSP 'frame-ancestors' directive.",
    },
    FindingDetail {
        code: "HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING",
        title: "X-Content-Type-Options not sent",
        category: FindingCategory::Headers,
        severity: Severity::Info,
        description: "Browsers may sniff the content type of responses and execute uploaded files as scripts.",
        remediation: "Send 'X-Content-Type-Options: nosniff'.",
    },
    FindingDetail {
        code: "HEADERS_X_XSS_PROTECTION_MISSING",
        title: "X-XSS-Protection not sent",
        category: FindingCategory::Headers,
        severity: Severity::Info,
        description: "Only older browsers honour this header, but graders still expect it to be set explicitly.",
        remediation: "Send 'X-XSS-Protection: 0' and rely on a Content-Security-Policy for script control.",
    },
    FindingDetail {
        code: "HEADERS_REFERRER_POLICY_MISSING",
        title: "Referrer-Policy not sent",
        category: FindingCategory::Headers,
        severity: Severity::Info,
        description: "Full URLs, including query strings, may leak to third-party sites through the Referer header.",
        remediation: "Send 'Referrer-Policy: strict-origin-when-cross-origin' or a stricter value.",
    },
    FindingDetail {
        code: "HEADERS_PERMISSIONS_POLICY_MISSING",
        title: "Permissions-Policy not sent",
        category: FindingCategory::Headers,
        severity: Severity::Info,
        description: "Embedded content can request camera, microphone or geolocation access that the site never needs.",
        remediation: "Send a Permissions-Policy that disables unused features, e.g. 'camera=(), microphone=(), geolocation=()'.",
    },
    // --- TLS ---
    FindingDetail {
        code: "TLS_CERT_EXPIRED",
        title: "Certificate has expired",
        category: FindingCategory::Tls,
        severity: Severity::Critical,
        description: "Browsers block the site with a full-page warning until a valid certificate is installed.",
        remediation: "Renew the certificate now and automate renewal (ACME clients such as Certbot do this).",
    },
    FindingDetail {
        code: "TLS_CERT_EXPIRING_SOON",
        title: "Certificate expires within 30 days",
        category: FindingCategory::Tls,
        severity: Severity::Warning,
        description: "The certificate is still valid but will lapse soon.",
        remediation: "Renew ahead of time and check that automated renewal is actually running.",
    },
    FindingDetail {
        code: "TLS_INFO_UNAVAILABLE",
        title: "Certificate could not be inspected",
        category: FindingCategory::Tls,
        severity: Severity::Warning,
        description: "No TLS handshake completed on port 443, so certificate facts are missing from this report.",
        remediation: "Check that the host serves HTTPS on port 443 and is reachable from the public internet.",
    },
    FindingDetail {
        code: "TLS_UNVERIFIED_FETCH",
        title: "Certificate failed verification",
        category: FindingCategory::Tls,
        severity: Severity::Critical,
        description: "The page could only be fetched with certificate checks disabled. Visitors see a security warning, and the detection results may be unreliable.",
        remediation: "Install a certificate issued by a public CA for this exact hostname, with the full intermediate chain.",
    },
    // --- Email ---
    FindingDetail {
        code: "EMAIL_SPF_MISSING",
        title: "No SPF record",
        category: FindingCategory::Email,
        severity: Severity::Warning,
        description: "Nothing tells receiving mail servers which hosts may send mail for this domain, which makes spoofing easier.",
        remediation: "Publish a TXT record starting with 'v=spf1' that lists the services sending your mail and ends with '-all' or '~all'.",
    },
    FindingDetail {
        code: "EMAIL_DMARC_MISSING",
        title: "No DMARC record",
        category: FindingCategory::Email,
        severity: Severity::Warning,
        description: "Receivers get no policy for mail that fails SPF or DKIM, and the owner gets no reports about abuse.",
        remediation: "Publish a TXT record at _dmarc.<domain>, starting with 'v=DMARC1; p=none; rua=mailto:...' and tighten the policy later.",
    },
    FindingDetail {
        code: "EMAIL_MX_MISSING",
        title: "No mail exchangers",
        category: FindingCategory::Email,
        severity: Severity::Info,
        description: "The domain does not receive mail. That is fine for web-only domains, which should still publish 'v=spf1 -all'.",
        remediation: "If the domain should not send mail either, publish a null SPF record and a reject DMARC policy.",
    },
    // --- Domain ---
    FindingDetail {
        code: "DOMAIN_RECENTLY_REGISTERED",
        title: "Domain registered less than a year ago",
        category: FindingCategory::Domain,
        severity: Severity::Info,
        description: "Young domains are common for new projects but also for phishing; some filters treat them with suspicion.",
        remediation: "Nothing to fix. Keep this in mind when judging the site's reputation.",
    },
];

/// Security header name → finding raised when it is missing.
static HEADER_FINDINGS: &[(&str, &str)] = &[
    ("Strict-Transport-Security", "HEADERS_HSTS_MISSING"),
    ("Content-Security-Policy", "HEADERS_CSP_MISSING"),
    ("X-Frame-Options", "HEADERS_X_FRAME_OPTIONS_MISSING"),
    ("X-Content-Type-Options", "HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING"),
    ("X-XSS-Protection", "HEADERS_X_XSS_PROTECTION_MISSING"),
    ("Referrer-Policy", "HEADERS_REFERRER_POLICY_MISSING"),
    ("Permissions-Policy", "HEADERS_PERMISSIONS_POLICY_MISSING"),
];

pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

/// Every finding that applies to `result`, most severe first.
pub fn findings_for(result: &AnalysisResult) -> Vec<&'static FindingDetail> {
    let mut codes = Vec::new();

    for (header, code) in HEADER_FINDINGS {
        if result.security.headers.get(*header) == Some(&HeaderStatus::Missing) {
            codes.push(*code);
        }
    }

    if result.evidence.iter().any(|e| e.category == EvidenceCategory::Warning) {
        codes.push("TLS_UNVERIFIED_FETCH");
    }
    match result.ssl.as_ref().map(|ssl| ssl.status) {
        Some(CertificateStatus::Expired) => codes.push("TLS_CERT_EXPIRED"),
        Some(CertificateStatus::ExpiringSoon) => codes.push("TLS_CERT_EXPIRING_SOON"),
        Some(CertificateStatus::Valid) => {}
        None => codes.push("TLS_INFO_UNAVAILABLE"),
    }

    let email = &result.email_security;
    if email.spf != FOUND {
        codes.push("EMAIL_SPF_MISSING");
    }
    if email.dmarc != FOUND {
        codes.push("EMAIL_DMARC_MISSING");
    }
    if email.mx.is_empty() {
        codes.push("EMAIL_MX_MISSING");
    }

    if result.domain_info.as_ref().is_some_and(|info| info.age_years < 1) {
        codes.push("DOMAIN_RECENTLY_REGISTERED");
    }

    let mut findings: Vec<&'static FindingDetail> = codes.into_iter().filter_map(get_finding_detail).collect();
    findings.sort_by_key(|f| (severity_rank(&f.severity), f.category));
    findings
}

fn severity_rank(severity: &Severity) -> u8 {
    match severity {
        Severity::Critical => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::security::grade_security;
    use crate::core::models::{EmailSecurity, HttpSnapshot, Performance};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn result_with(headers: &[&str]) -> AnalysisResult {
        let http = HttpSnapshot {
            headers: headers.iter().map(|h| (h.to_string(), "1".to_string())).collect(),
            ..Default::default()
        };
        AnalysisResult {
            url: "https://example.com".into(),
            cdn_detected: "None detected".into(),
            confidence: 0,
            evidence: Vec::new(),
            ip_address: "192.0.2.1".into(),
            cnames: Vec::new(),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
            cms: None,
            cms_version: None,
            server: None,
            language: Vec::new(),
            frameworks: Vec::new(),
            analytics: Vec::new(),
            security: grade_security(&http),
            ssl: None,
            domain_info: None,
            email_security: EmailSecurity { spf: "Found".into(), dmarc: "Not found".into(), mx: vec!["mx.example.com".into()] },
            hosting_provider: "Unknown".into(),
            performance: Performance { response_time_ms: 1, compression: "none".into(), page_size_kb: None },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn every_code_in_header_table_exists() {
        for (_, code) in HEADER_FINDINGS {
            assert!(get_finding_detail(code).is_some(), "missing {code}");
        }
    }

    #[test]
    fn missing_headers_and_records_become_findings() {
        let result = result_with(&["Strict-Transport-Security", "Content-Security-Policy", "X-Frame-Options"]);
        let codes: Vec<&str> = findings_for(&result).iter().map(|f| f.code).collect();
        assert!(codes.contains(&"HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING"));
        assert!(!codes.contains(&"HEADERS_HSTS_MISSING"));
        assert!(codes.contains(&"EMAIL_DMARC_MISSING"));
        assert!(!codes.contains(&"EMAIL_SPF_MISSING"));
        assert!(codes.contains(&"TLS_INFO_UNAVAILABLE"));
    }

    #[test]
    fn findings_are_ordered_by_severity() {
        let findings = findings_for(&result_with(&[]));
        let ranks: Vec<u8> = findings.iter().map(|f| severity_rank(&f.severity)).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
    }
}
