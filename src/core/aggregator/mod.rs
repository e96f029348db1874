// src/core/aggregator/mod.rs

//! Turns raw probe output into named classifications.
//!
//! Each category is independent and tolerates "no signal": the CDN falls back to
//! "None detected", the CMS to absent, the hosting provider to "Unknown".

pub mod cdn;
pub mod cms;
pub mod security;
pub mod technology;

use tracing::{debug, info};

use crate::core::models::{Evidence, EvidenceCategory, HttpSnapshot, ProbeResult, SecurityReport};
use crate::core::signatures::{CDN_SIGNATURES, CMS_SIGNATURES, HOSTING_PROVIDERS, TECHNOLOGY_SIGNATURES};

use self::cdn::CdnVerdict;
use self::cms::CmsVerdict;
use self::technology::TechnologyProfile;

pub const UNKNOWN_HOSTING: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct Classification {
    pub cdn: CdnVerdict,
    pub cms: Option<CmsVerdict>,
    pub security: SecurityReport,
    pub technologies: TechnologyProfile,
    pub hosting_provider: String,
    pub evidence: Vec<Evidence>,
}

/// Runs every classifier over the collected signals.
pub fn classify(http: &HttpSnapshot, cnames: &[String], reverse_dns: &ProbeResult<String>) -> Classification {
    let mut evidence = Vec::new();

    if !http.verified_tls {
        evidence.push(Evidence::new(
            EvidenceCategory::Warning,
            "⚠ SSL certificate verification failed; results may be unreliable",
        ));
    }

    let scores = cdn::score_cdns(CDN_SIGNATURES, http.header_names(), cnames, &mut evidence);
    let cdn = cdn::select_cdn(&scores);
    let cms = cms::detect_cms(CMS_SIGNATURES, http, &mut evidence);
    let security = security::grade_security(http);
    let technologies = technology::detect_technologies(TECHNOLOGY_SIGNATURES, http);
    let hosting_provider = classify_hosting(reverse_dns, &mut evidence);

    info!(
        cdn = %cdn.name,
        cdn_score = cdn.score,
        confidence = cdn.confidence,
        cms = ?cms.as_ref().map(|c| c.name),
        grade = %security.grade,
        hosting = %hosting_provider,
        "Classification finished."
    );

    Classification { cdn, cms, security, technologies, hosting_provider, evidence }
}

/// Maps a PTR hostname to a provider; first table hit wins, anything else is "Unknown".
pub fn classify_hosting(reverse_dns: &ProbeResult<String>, evidence: &mut Vec<Evidence>) -> String {
    let hostname = match reverse_dns {
        Ok(hostname) => hostname,
        Err(failure) => {
            debug!(%failure, "No PTR hostname, hosting provider unknown.");
            return UNKNOWN_HOSTING.to_string();
        }
    };

    let lowered = hostname.to_lowercase();
    match HOSTING_PROVIDERS.iter().find(|(fragment, _)| lowered.contains(fragment)) {
        Some((_, provider)) => {
            evidence.push(Evidence::new(EvidenceCategory::Hosting, format!("PTR '{hostname}' → {provider}")));
            provider.to_string()
        }
        None => UNKNOWN_HOSTING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProbeFailure;

    #[test]
    fn ptr_hostname_maps_to_provider_case_insensitively() {
        let mut evidence = Vec::new();
        let ptr = Ok("EC2-3-5-7-9.Compute-1.AmazonAWS.com".to_string());
        assert_eq!(classify_hosting(&ptr, &mut evidence), "Amazon");
        assert_eq!(evidence.len(), 1);
    }

    #[test]
    fn unmatched_or_failed_ptr_is_unknown() {
        let mut evidence = Vec::new();
        assert_eq!(classify_hosting(&Ok("host.example.net".into()), &mut evidence), UNKNOWN_HOSTING);
        assert_eq!(classify_hosting(&Err(ProbeFailure::Timeout), &mut evidence), UNKNOWN_HOSTING);
        assert!(evidence.is_empty());
    }

    #[test]
    fn unverified_fetch_adds_warning_evidence() {
        let http = HttpSnapshot { verified_tls: false, ..Default::default() };
        let classification = classify(&http, &[], &Err(ProbeFailure::NoData));
        assert_eq!(classification.evidence[0].category, EvidenceCategory::Warning);
        assert_eq!(classification.cdn.name, cdn::NO_CDN);
        assert!(classification.cms.is_none());
    }
}
