// src/core/models.rs

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use strum::Display;

use crate::core::error::{AnalysisError, ProbeFailure};

// --- Reusable Result Types ---

/// Outcome of a single probe: a typed payload or the tag describing why there is none.
pub type ProbeResult<T> = Result<T, ProbeFailure>;

// --- Target ---

/// The analysed site, built once by the normalizer and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The input exactly as the caller supplied it.
    pub raw: String,
    /// Absolute URL with scheme, validated against the domain grammar.
    pub url: String,
    /// Host only, lowercased, no scheme, port or path.
    pub domain: String,
    /// `domain` with `www.` added, or stripped when already present.
    pub alternate_domain: String,
}

// --- Severity (shared with the knowledge base) ---

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

// --- Probe Kinds ---

/// Names a probe in warnings and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProbeKind {
    #[strum(serialize = "HTTP")]
    Http,
    #[strum(serialize = "DNS")]
    Dns,
    #[strum(serialize = "TLS")]
    Tls,
    #[strum(serialize = "WHOIS")]
    Whois,
    #[strum(serialize = "Reverse DNS")]
    ReverseDns,
}

// --- Evidence ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EvidenceCategory {
    #[strum(serialize = "CDN")]
    Cdn,
    #[strum(serialize = "CMS")]
    Cms,
    Hosting,
    Warning,
}

/// Why a classification was made, e.g. `CNAME 'x.cloudfront.net' → Amazon CloudFront`.
///
/// Serialized as its detail string so the response keeps a flat `evidence[]` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub category: EvidenceCategory,
    pub detail: String,
}

impl Evidence {
    pub fn new(category: EvidenceCategory, detail: impl Into<String>) -> Self {
        Self { category, detail: detail.into() }
    }
}

impl Serialize for Evidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.detail)
    }
}

// --- HTTP Probe Models ---

/// Headers and bounded body prefix captured by the HTTP probe.
#[derive(Debug, Clone, Default)]
pub struct HttpSnapshot {
    pub final_url: String,
    pub status: u16,
    /// Response headers in arrival order; names in canonical `Train-Case`.
    pub headers: Vec<(String, String)>,
    /// First bytes of the body (bounded), lossily decoded as UTF-8.
    pub body: Option<String>,
    /// `false` when the fetch only succeeded with certificate verification disabled.
    pub verified_tls: bool,
}

impl HttpSnapshot {
    /// Case-insensitive lookup of the first header with this exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(k, _)| k.as_str())
    }

    /// Every `Set-Cookie` value joined with `"; "`.
    pub fn cookies(&self) -> String {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Headers folded into a map; repeated names are joined with `", "`.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.headers {
            map.entry(name.clone())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        map
    }
}

// --- DNS Probe Models ---

#[derive(Debug, Clone)]
pub struct DnsRecords {
    /// CNAME targets of the bare domain followed by those of its `www.` sibling.
    pub cnames: Vec<String>,
    /// The first TXT record containing `v=spf1`.
    pub spf: ProbeResult<String>,
    /// The first `_dmarc` TXT record containing `v=DMARC1`.
    pub dmarc: ProbeResult<String>,
    /// Mail exchangers ordered by preference.
    pub mx: ProbeResult<Vec<String>>,
}

impl Default for DnsRecords {
    fn default() -> Self {
        Self {
            cnames: Vec::new(),
            spf: Err(ProbeFailure::NoData),
            dmarc: Err(ProbeFailure::NoData),
            mx: Err(ProbeFailure::NoData),
        }
    }
}

// --- TLS Probe Models ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFacts {
    pub issuer: String,
    pub subject: String,
    pub not_after: DateTime<Utc>,
    /// Negative once the certificate has expired.
    pub days_remaining: i64,
    pub tls_version: String,
}

// --- WHOIS Probe Models ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    pub registrar: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    /// Registrar WHOIS server advertised by the registry, if any.
    pub referral: Option<String>,
}

// --- Probe Set Output ---

/// Everything the probe set gathered for one analysis, after the fatal gates passed.
#[derive(Debug, Clone)]
pub struct ProbeOutcomes {
    pub target: Target,
    pub ip_address: std::net::IpAddr,
    pub http: HttpSnapshot,
    pub response_time: Duration,
    pub dns: DnsRecords,
    pub tls: ProbeResult<CertificateFacts>,
    pub whois: ProbeResult<WhoisRecord>,
    /// PTR hostname of `ip_address`.
    pub reverse_dns: ProbeResult<String>,
}

// --- Analysis Result ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Grade {
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum HeaderStatus {
    Present,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityReport {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    /// Display name of each graded header → presence.
    pub headers: BTreeMap<String, HeaderStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum CertificateStatus {
    Valid,
    #[serde(rename = "Expiring Soon")]
    #[strum(serialize = "Expiring Soon")]
    ExpiringSoon,
    Expired,
}

#[derive(Debug, Clone, Serialize)]
pub struct SslInfo {
    pub issuer: String,
    pub subject: String,
    /// `YYYY-MM-DD`.
    pub valid_until: String,
    pub days_remaining: i64,
    pub tls_version: String,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainInfo {
    pub age_years: i64,
    pub age_days: i64,
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSecurity {
    pub spf: String,
    pub dmarc: String,
    pub mx: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Performance {
    pub response_time_ms: u64,
    pub compression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size_kb: Option<f64>,
}

/// The terminal output of an analysis. Optional categories are omitted, never null.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub cdn_detected: String,
    pub confidence: u32,
    pub evidence: Vec<Evidence>,
    pub ip_address: String,
    pub cnames: Vec<String>,
    pub headers: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub language: Vec<String>,
    pub frameworks: Vec<String>,
    pub analytics: Vec<String>,
    pub security: SecurityReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<SslInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_info: Option<DomainInfo>,
    pub email_security: EmailSecurity,
    pub hosting_provider: String,
    pub performance: Performance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// What the caller sends back: the full result, or only `{ "error": ... }`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Success(Box<AnalysisResult>),
    Failure { error: String },
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisResponse {
    fn from(outcome: Result<AnalysisResult, AnalysisError>) -> Self {
        match outcome {
            Ok(result) => AnalysisResponse::Success(Box::new(result)),
            Err(e) => AnalysisResponse::Failure { error: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> HttpSnapshot {
        HttpSnapshot {
            headers: vec![
                ("Server".into(), "nginx".into()),
                ("Set-Cookie".into(), "a=1".into()),
                ("Set-Cookie".into(), "wp-settings-1=x".into()),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let http = snapshot();
        assert_eq!(http.header("SERVER"), Some("nginx"));
        assert!(!http.has_header("x-powered-by"));
    }

    #[test]
    fn cookies_and_header_map_fold_repeated_headers() {
        let http = snapshot();
        assert_eq!(http.cookies(), "a=1; wp-settings-1=x");
        assert_eq!(http.header_map()["Set-Cookie"], "a=1, wp-settings-1=x");
    }

    #[test]
    fn failure_response_only_carries_error() {
        let response = AnalysisResponse::from(Err(AnalysisError::UnresolvableDomain("nope.invalid".into())));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Domain \"nope.invalid\" does not exist or cannot be resolved." })
        );
    }

    #[test]
    fn grade_serializes_with_plus_sign() {
        assert_eq!(serde_json::to_value(Grade::APlus).unwrap(), "A+");
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(CertificateStatus::ExpiringSoon.to_string(), "Expiring Soon");
    }
}
