// src/core/assembler.rs

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::aggregator::{self, Classification};
use crate::core::models::{
    AnalysisResult, CertificateFacts, CertificateStatus, DomainInfo, EmailSecurity, HttpSnapshot, Performance,
    ProbeKind, ProbeOutcomes, ProbeResult, SslInfo, WhoisRecord,
};

/// Certificates expiring within this many days are flagged.
const EXPIRY_WARNING_DAYS: i64 = 30;

pub const FOUND: &str = "Found";
const NOT_FOUND: &str = "Not found";

/// Merges probe and classifier output into the final result. Never fails.
pub fn assemble(outcomes: ProbeOutcomes, now: DateTime<Utc>) -> AnalysisResult {
    let Classification { cdn, cms, security, technologies, hosting_provider, evidence } =
        aggregator::classify(&outcomes.http, &outcomes.dns.cnames, &outcomes.reverse_dns);

    let warnings = collect_warnings(&outcomes);
    let ssl = outcomes.tls.as_ref().ok().map(ssl_info);
    let domain_info = outcomes.whois.as_ref().ok().and_then(|record| domain_info(record, now));
    let email_security = EmailSecurity {
        spf: presence(&outcomes.dns.spf),
        dmarc: presence(&outcomes.dns.dmarc),
        mx: outcomes.dns.mx.clone().unwrap_or_default(),
    };
    let performance = Performance {
        response_time_ms: u64::try_from(outcomes.response_time.as_millis()).unwrap_or(u64::MAX),
        compression: compression(&outcomes.http),
        page_size_kb: page_size_kb(&outcomes.http),
    };

    info!(
        url = %outcomes.target.url,
        cdn = %cdn.name,
        ssl = ssl.is_some(),
        domain_info = domain_info.is_some(),
        warnings = warnings.len(),
        "Result assembled."
    );

    AnalysisResult {
        url: outcomes.target.url,
        cdn_detected: cdn.name.to_string(),
        confidence: cdn.confidence,
        evidence,
        ip_address: outcomes.ip_address.to_string(),
        cnames: outcomes.dns.cnames,
        headers: outcomes.http.header_map(),
        timestamp: now,
        cms: cms.as_ref().map(|c| c.name.to_string()),
        cms_version: cms.and_then(|c| c.version),
        server: technologies.server,
        language: technologies.language,
        frameworks: technologies.frameworks,
        analytics: technologies.analytics,
        security,
        ssl,
        domain_info,
        email_security,
        hosting_provider,
        performance,
        warnings,
    }
}

fn ssl_info(facts: &CertificateFacts) -> SslInfo {
    SslInfo {
        issuer: facts.issuer.clone(),
        subject: facts.subject.clone(),
        valid_until: facts.not_after.format("%Y-%m-%d").to_string(),
        days_remaining: facts.days_remaining,
        tls_version: facts.tls_version.clone(),
        status: certificate_status(facts.days_remaining),
    }
}

pub fn certificate_status(days_remaining: i64) -> CertificateStatus {
    match days_remaining {
        days if days < 0 => CertificateStatus::Expired,
        0..=EXPIRY_WARNING_DAYS => CertificateStatus::ExpiringSoon,
        _ => CertificateStatus::Valid,
    }
}

/// Age facts need a creation date; without one the category is absent.
fn domain_info(record: &WhoisRecord, now: DateTime<Utc>) -> Option<DomainInfo> {
    let created = record.created?;
    let age_days = now.signed_duration_since(created).num_days().max(0);
    Some(DomainInfo {
        age_years: age_days / 365,
        age_days,
        created: created.format("%Y-%m-%d").to_string(),
        expires: record.expires.map(|d| d.format("%Y-%m-%d").to_string()),
        registrar: record.registrar.clone(),
    })
}

fn presence(record: &ProbeResult<String>) -> String {
    match record {
        Ok(_) => FOUND.to_string(),
        Err(_) => NOT_FOUND.to_string(),
    }
}

fn compression(http: &HttpSnapshot) -> String {
    let encoding = http.header("content-encoding").unwrap_or("").to_ascii_lowercase();
    if encoding.contains("gzip") {
        "gzip".to_string()
    } else if encoding.contains("br") {
        "br".to_string()
    } else {
        "none".to_string()
    }
}

fn page_size_kb(http: &HttpSnapshot) -> Option<f64> {
    let bytes: u64 = http.header("content-length")?.trim().parse().ok()?;
    Some((bytes as f64 / 1024.0 * 100.0).round() / 100.0)
}

/// Degraded probes worth telling the caller about; plain absences are not listed.
fn collect_warnings(outcomes: &ProbeOutcomes) -> Vec<String> {
    let mut warnings = Vec::new();

    if !outcomes.http.verified_tls {
        warnings.push(format!(
            "{}: certificate verification failed, the page was fetched without it",
            ProbeKind::Http
        ));
    }
    if let Err(failure) = &outcomes.tls {
        warnings.push(format!("{} probe unavailable: {failure}", ProbeKind::Tls));
    }
    note_failure(&mut warnings, ProbeKind::Whois, "registration lookup", &outcomes.whois);
    note_failure(&mut warnings, ProbeKind::Dns, "SPF lookup", &outcomes.dns.spf);
    note_failure(&mut warnings, ProbeKind::Dns, "DMARC lookup", &outcomes.dns.dmarc);
    note_failure(&mut warnings, ProbeKind::Dns, "MX lookup", &outcomes.dns.mx);
    note_failure(&mut warnings, ProbeKind::ReverseDns, "PTR lookup", &outcomes.reverse_dns);

    debug!(count = warnings.len(), "Collected probe warnings.");
    warnings
}

fn note_failure<T>(warnings: &mut Vec<String>, kind: ProbeKind, what: &str, outcome: &ProbeResult<T>) {
    if let Err(failure) = outcome {
        if !failure.is_absence() {
            warnings.push(format!("{kind} probe degraded ({what}): {failure}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProbeFailure;
    use crate::core::models::{DnsRecords, Grade};
    use crate::core::normalizer::normalize;
    use chrono::TimeZone;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn outcomes() -> ProbeOutcomes {
        ProbeOutcomes {
            target: normalize("example.com").unwrap(),
            ip_address: IpAddr::V4(Ipv4Addr::new(13, 32, 0, 1)),
            http: HttpSnapshot {
                final_url: "https://example.com/".into(),
                status: 200,
                headers: vec![
                    ("Content-Type".into(), "text/html".into()),
                    ("Content-Encoding".into(), "gzip".into()),
                    ("Content-Length".into(), "2048".into()),
                    ("Strict-Transport-Security".into(), "max-age=63072000".into()),
                ],
                body: Some(String::new()),
                verified_tls: true,
            },
            response_time: Duration::from_millis(321),
            dns: DnsRecords {
                cnames: vec!["d111111abcdef8.cloudfront.net".into()],
                spf: Ok("v=spf1 -all".into()),
                dmarc: Err(ProbeFailure::NoData),
                mx: Ok(vec!["mx1.example.com".into()]),
            },
            tls: Err(ProbeFailure::Timeout),
            whois: Ok(WhoisRecord {
                registrar: Some("Example Registrar".into()),
                created: Some(Utc.with_ymd_and_hms(2015, 5, 1, 0, 0, 0).unwrap()),
                expires: None,
                referral: None,
            }),
            reverse_dns: Err(ProbeFailure::NoData),
        }
    }

    #[test]
    fn tls_timeout_leaves_other_categories_populated() {
        let result = assemble(outcomes(), now());
        assert!(result.ssl.is_none());
        assert_eq!(result.cdn_detected, "Amazon CloudFront");
        assert_eq!(result.confidence, 40);
        assert_eq!(result.security.score, 20);
        assert_eq!(result.security.grade, Grade::F);
        assert_eq!(result.headers["Content-Type"], "text/html");
        assert!(result.warnings.iter().any(|w| w.starts_with("TLS probe unavailable")));

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("ssl").is_none());
        assert!(json.get("cms").is_none());
    }

    #[test]
    fn performance_and_email_facts() {
        let result = assemble(outcomes(), now());
        assert_eq!(result.performance.response_time_ms, 321);
        assert_eq!(result.performance.compression, "gzip");
        assert_eq!(result.performance.page_size_kb, Some(2.0));
        assert_eq!(result.email_security.spf, "Found");
        assert_eq!(result.email_security.dmarc, "Not found");
        assert_eq!(result.email_security.mx, vec!["mx1.example.com"]);
        assert_eq!(result.hosting_provider, "Unknown");
    }

    #[test]
    fn domain_age_is_measured_from_creation() {
        let info = assemble(outcomes(), now()).domain_info.unwrap();
        assert_eq!(info.created, "2015-05-01");
        assert_eq!(info.age_years, 10);
        assert!(info.age_days >= 3650);
        assert_eq!(info.registrar.as_deref(), Some("Example Registrar"));
    }

    #[test]
    fn certificate_facts_are_reported_with_status() {
        let mut canned = outcomes();
        canned.tls = Ok(CertificateFacts {
            issuer: "Let's Encrypt".into(),
            subject: "example.com".into(),
            not_after: Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap(),
            days_remaining: 18,
            tls_version: "TLSv1.3".into(),
        });
        let ssl = assemble(canned, now()).ssl.unwrap();
        assert_eq!(ssl.valid_until, "2025-06-20");
        assert_eq!(ssl.status, CertificateStatus::ExpiringSoon);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(certificate_status(-1), CertificateStatus::Expired);
        assert_eq!(certificate_status(0), CertificateStatus::ExpiringSoon);
        assert_eq!(certificate_status(30), CertificateStatus::ExpiringSoon);
        assert_eq!(certificate_status(31), CertificateStatus::Valid);
    }

    #[test]
    fn brotli_and_missing_length() {
        let mut http = HttpSnapshot::default();
        http.headers.push(("content-encoding".into(), "br".into()));
        assert_eq!(compression(&http), "br");
        assert_eq!(page_size_kb(&http), None);
        assert_eq!(compression(&HttpSnapshot::default()), "none");
    }

    #[test]
    fn absences_do_not_produce_warnings() {
        let mut canned = outcomes();
        canned.tls = Ok(CertificateFacts {
            issuer: "R3".into(),
            subject: "example.com".into(),
            not_after: now(),
            days_remaining: 90,
            tls_version: "TLSv1.2".into(),
        });
        assert!(assemble(canned, now()).warnings.is_empty());
    }
}
