// src/core/probes/mod.rs

//! Independent evidence probes and the fan-out/fan-in join that runs them.

pub mod dns_probe;
pub mod hosting_probe;
pub mod http_probe;
pub mod tls_probe;
pub mod whois_probe;

use std::net::IpAddr;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::AnalyzerConfig;
use crate::core::error::{AnalysisError, ProbeFailure};
use crate::core::models::{HttpSnapshot, ProbeOutcomes, ProbeResult, Target};

/// Runs every probe concurrently and waits for all of them.
///
/// Reverse DNS is chained after the forward lookup it depends on; everything
/// else starts at once. Dropping the returned future cancels every probe.
pub async fn run_probe_set(target: &Target, config: &AnalyzerConfig) -> Result<ProbeOutcomes, AnalysisError> {
    info!(domain = %target.domain, "Launching probe set.");
    let resolver = dns_probe::build_resolver(config.dns_timeout);

    let address_chain = async {
        let ip = dns_probe::resolve_address(&resolver, &target.domain, config.dns_timeout).await;
        let reverse_dns = match &ip {
            Ok(ip) => hosting_probe::reverse_lookup(&resolver, *ip, config.dns_timeout).await,
            Err(_) => Err(ProbeFailure::NoData),
        };
        (ip, reverse_dns)
    };
    let timed_http = async {
        let started = Instant::now();
        let http = http_probe::run_http_probe(target, config).await;
        (http, started.elapsed())
    };

    let ((ip, reverse_dns), (http, response_time), dns, tls, whois) = tokio::join!(
        address_chain,
        timed_http,
        dns_probe::run_dns_probe(&resolver, target, config.dns_timeout),
        tls_probe::run_tls_probe(&target.domain, config.tls_timeout),
        whois_probe::run_whois_probe(&target.domain, config.whois_timeout),
    );

    let (ip_address, http) = gate(target, ip, http, config.http_timeout)?;
    info!(ip = %ip_address, elapsed_ms = response_time.as_millis() as u64, "All probes returned.");

    Ok(ProbeOutcomes {
        target: target.clone(),
        ip_address,
        http,
        response_time,
        dns,
        tls,
        whois,
        reverse_dns,
    })
}

/// Only two probes can end an analysis: the address lookup and the HTTP fetch.
fn gate(
    target: &Target,
    ip: ProbeResult<IpAddr>,
    http: ProbeResult<HttpSnapshot>,
    http_timeout: Duration,
) -> Result<(IpAddr, HttpSnapshot), AnalysisError> {
    let domain = target.domain.clone();
    let ip = ip.map_err(|failure| {
        error!(%domain, %failure, "Domain did not resolve.");
        AnalysisError::UnresolvableDomain(domain.clone())
    })?;

    let http = http.map_err(|failure| {
        error!(%domain, %failure, "HTTP fetch failed.");
        match failure {
            ProbeFailure::Unreachable => AnalysisError::Unreachable(domain.clone()),
            ProbeFailure::Timeout => AnalysisError::Timeout { domain: domain.clone(), seconds: http_timeout.as_secs() },
            ProbeFailure::RedirectLoop => AnalysisError::RedirectLoop(domain.clone()),
            ProbeFailure::NoSuchDomain => AnalysisError::UnresolvableDomain(domain.clone()),
            ProbeFailure::Protocol(reason) => AnalysisError::FetchFailed { domain: domain.clone(), reason },
            ProbeFailure::NoData => {
                AnalysisError::FetchFailed { domain: domain.clone(), reason: "the server sent no response".into() }
            }
        }
    })?;

    Ok((ip, http))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use std::net::Ipv4Addr;

    fn target() -> Target {
        normalize("example.com").unwrap()
    }

    fn ip() -> ProbeResult<IpAddr> {
        Ok(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
    }

    #[test]
    fn unresolvable_domain_wins_over_http_failure() {
        let outcome = gate(&target(), Err(ProbeFailure::NoSuchDomain), Err(ProbeFailure::Unreachable), Duration::from_secs(10));
        assert_eq!(outcome.unwrap_err(), AnalysisError::UnresolvableDomain("example.com".into()));
    }

    #[test]
    fn http_failures_map_to_distinct_causes() {
        let limit = Duration::from_secs(10);
        let err = |f| gate(&target(), ip(), Err(f), limit).unwrap_err();
        assert_eq!(err(ProbeFailure::Unreachable), AnalysisError::Unreachable("example.com".into()));
        assert_eq!(err(ProbeFailure::Timeout), AnalysisError::Timeout { domain: "example.com".into(), seconds: 10 });
        assert_eq!(err(ProbeFailure::RedirectLoop), AnalysisError::RedirectLoop("example.com".into()));
        assert!(matches!(err(ProbeFailure::Protocol("bad".into())), AnalysisError::FetchFailed { .. }));
    }

    #[test]
    fn healthy_probes_pass_the_gate() {
        let (address, http) = gate(&target(), ip(), Ok(HttpSnapshot::default()), Duration::from_secs(10)).unwrap();
        assert!(address.is_ipv4());
        assert_eq!(http.status, 0);
    }

    #[test]
    fn timeout_message_names_the_budget() {
        let err = gate(&target(), ip(), Err(ProbeFailure::Timeout), Duration::from_secs(10)).unwrap_err();
        assert_eq!(err.to_string(), "Request to \"example.com\" timed out after 10 seconds.");
    }
}
