// src/core/aggregator/cdn.rs

use tracing::debug;

use crate::core::models::{Evidence, EvidenceCategory};
use crate::core::signatures::CdnSignature;

pub const NO_CDN: &str = "None detected";

const HEADER_WEIGHT: u32 = 3;
const CNAME_WEIGHT: u32 = 4;

/// Accumulated weight per candidate, in signature declaration order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassificationScore {
    scores: Vec<(&'static str, u32)>,
}

impl ClassificationScore {
    fn add(&mut self, name: &'static str, weight: u32) {
        match self.scores.iter_mut().find(|(candidate, _)| *candidate == name) {
            Some((_, total)) => *total += weight,
            None => self.scores.push((name, weight)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> u32 {
        self.scores
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    /// Highest score; on a tie the first-declared candidate is kept.
    pub fn winner(&self) -> Option<(&'static str, u32)> {
        let mut best: Option<(&'static str, u32)> = None;
        for &(name, score) in &self.scores {
            if score == 0 {
                continue;
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((name, score));
            }
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnVerdict {
    pub name: String,
    pub score: u32,
    pub confidence: u32,
}

pub fn confidence_for(score: u32) -> u32 {
    score.saturating_mul(10).min(100)
}

/// Scores every signature against header names and CNAME targets.
///
/// A signature header counts once if it is a case-insensitive substring of any
/// response header name. Each matching CNAME counts separately.
pub fn score_cdns<'a>(
    signatures: &[CdnSignature],
    header_names: impl Iterator<Item = &'a str>,
    cnames: &[String],
    evidence: &mut Vec<Evidence>,
) -> ClassificationScore {
    let lowered_headers: Vec<String> = header_names.map(str::to_ascii_lowercase).collect();
    let mut scores = ClassificationScore::default();

    for sig in signatures {
        let mut score = 0;
        for header in sig.headers {
            let needle = header.to_ascii_lowercase();
            if lowered_headers.iter().any(|name| name.contains(&needle)) {
                score += HEADER_WEIGHT;
                evidence.push(Evidence::new(EvidenceCategory::Cdn, format!("Header '{header}' → {}", sig.name)));
            }
        }
        for cname in cnames {
            if sig.cname.is_match(&cname.to_lowercase()) {
                score += CNAME_WEIGHT;
                evidence.push(Evidence::new(EvidenceCategory::Cdn, format!("CNAME '{cname}' → {}", sig.name)));
            }
        }
        if score > 0 {
            debug!(cdn = sig.name, score, "CDN signature matched.");
            scores.add(sig.name, score);
        }
    }
    scores
}

/// Picks the CDN verdict from accumulated scores, or "None detected" with confidence 0.
pub fn select_cdn(scores: &ClassificationScore) -> CdnVerdict {
    match scores.winner() {
        Some((name, score)) => CdnVerdict {
            name: name.to_string(),
            score,
            confidence: confidence_for(score),
        },
        None => CdnVerdict { name: NO_CDN.to_string(), score: 0, confidence: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signatures::CDN_SIGNATURES;

    fn classify(headers: &[&str], cnames: &[&str]) -> (CdnVerdict, ClassificationScore, Vec<Evidence>) {
        let cnames: Vec<String> = cnames.iter().map(|c| c.to_string()).collect();
        let mut evidence = Vec::new();
        let scores = score_cdns(CDN_SIGNATURES, headers.iter().copied(), &cnames, &mut evidence);
        (select_cdn(&scores), scores, evidence)
    }

    #[test]
    fn cloudfront_cname_alone_yields_forty() {
        let (verdict, _, evidence) = classify(&["Content-Type"], &["xyz.cloudfront.net"]);
        assert_eq!(verdict.name, "Amazon CloudFront");
        assert_eq!(verdict.confidence, 40);
        assert!(evidence.iter().any(|e| e.detail == "CNAME 'xyz.cloudfront.net' → Amazon CloudFront"));
    }

    #[test]
    fn no_signal_reports_none_detected() {
        let (verdict, _, evidence) = classify(&["Server", "Date"], &[]);
        assert_eq!(verdict.name, NO_CDN);
        assert_eq!(verdict.confidence, 0);
        assert!(evidence.is_empty());
    }

    #[test]
    fn header_names_match_as_case_insensitive_substrings() {
        let (verdict, scores, _) = classify(&["CF-RAY", "Cf-Cache-Status"], &[]);
        assert_eq!(verdict.name, "CloudFlare");
        assert_eq!(scores.get("CloudFlare"), 6);
        assert_eq!(verdict.confidence, 60);
    }

    #[test]
    fn confidence_is_capped_at_one_hundred() {
        let (verdict, _, _) = classify(
            &["cf-ray", "cf-cache-status"],
            &["a.cdn.cloudflare.net", "b.cdn.cloudflare.net", "c.cdn.cloudflare.net"],
        );
        assert_eq!(verdict.score, 18);
        assert_eq!(verdict.confidence, 100);
    }

    #[test]
    fn tie_goes_to_first_declared_signature() {
        // Fastly (x-served-by) and KeyCDN (x-edge-location) both score 3.
        let (verdict, scores, _) = classify(&["x-served-by", "x-edge-location"], &[]);
        assert_eq!(scores.get("Fastly"), scores.get("KeyCDN"));
        assert_eq!(verdict.name, "Fastly");
    }

    #[test]
    fn adding_matching_evidence_never_lowers_a_score() {
        let (_, before, _) = classify(&["x-amz-cf-id"], &[]);
        let (_, after, _) = classify(&["x-amz-cf-id"], &["d1.cloudfront.net"]);
        assert!(after.get("Amazon CloudFront") >= before.get("Amazon CloudFront"));
        for score in 0..20 {
            assert_eq!(confidence_for(score), (score * 10).min(100));
        }
    }
}
