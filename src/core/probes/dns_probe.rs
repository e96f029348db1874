// src/core/probes/dns_probe.rs

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::error::ProbeFailure;
use crate::core::models::{DnsRecords, ProbeResult, Target};

/// One resolver per analysis; nothing is cached across requests.
pub fn build_resolver(query_timeout: Duration) -> TokioAsyncResolver {
    let mut opts = ResolverOpts::default();
    opts.timeout = query_timeout;
    opts.attempts = 2;
    TokioAsyncResolver::tokio(ResolverConfig::default(), opts)
}

/// Resolves CNAME, SPF, DMARC and MX records. Never fails as a whole.
///
/// Each sub-lookup is independent: a missing record of one type only marks that
/// sub-check as absent.
pub async fn run_dns_probe(resolver: &TokioAsyncResolver, target: &Target, query_timeout: Duration) -> DnsRecords {
    info!(domain = %target.domain, "Starting DNS probe.");

    let (primary, alternate, spf, dmarc, mx) = tokio::join!(
        lookup_cnames(resolver, &target.domain, query_timeout),
        lookup_cnames(resolver, &target.alternate_domain, query_timeout),
        lookup_spf(resolver, &target.domain, query_timeout),
        lookup_dmarc(resolver, &target.domain, query_timeout),
        lookup_mx(resolver, &target.domain, query_timeout),
    );

    let mut cnames = primary;
    cnames.extend(alternate);

    info!(cnames = cnames.len(), spf = spf.is_ok(), dmarc = dmarc.is_ok(), "DNS probe finished.");
    DnsRecords { cnames, spf, dmarc, mx }
}

/// Forward lookup of the bare domain. IPv4 preferred, like a plain `gethostbyname`.
pub async fn resolve_address(resolver: &TokioAsyncResolver, domain: &str, query_timeout: Duration) -> ProbeResult<IpAddr> {
    debug!(domain, "Resolving host address.");
    let lookup = bounded(query_timeout, resolver.lookup_ip(domain)).await.map_err(|failure| {
        warn!(domain, %failure, "Address lookup failed.");
        failure
    })?;
    let addresses: Vec<IpAddr> = lookup.iter().collect();
    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
        .ok_or(ProbeFailure::NoData)
}

async fn lookup_cnames(resolver: &TokioAsyncResolver, name: &str, query_timeout: Duration) -> Vec<String> {
    match bounded(query_timeout, resolver.lookup(name, RecordType::CNAME)).await {
        Ok(lookup) => {
            let targets: Vec<String> = lookup
                .iter()
                .filter_map(|record| match record {
                    RData::CNAME(cname) => Some(cname.to_utf8().trim_end_matches('.').to_string()),
                    _ => None,
                })
                .collect();
            debug!(name, count = targets.len(), "CNAME records found.");
            targets
        }
        Err(failure) => {
            debug!(name, %failure, "No CNAME records.");
            Vec::new()
        }
    }
}

async fn lookup_spf(resolver: &TokioAsyncResolver, domain: &str, query_timeout: Duration) -> ProbeResult<String> {
    let records = bounded(query_timeout, resolver.txt_lookup(domain)).await?;
    let spf = records.iter().map(|r| r.to_string()).find(|r| r.contains("v=spf1"));
    debug!(domain, found = spf.is_some(), "SPF lookup finished.");
    spf.ok_or(ProbeFailure::NoData)
}

async fn lookup_dmarc(resolver: &TokioAsyncResolver, domain: &str, query_timeout: Duration) -> ProbeResult<String> {
    let dmarc_target = format!("_dmarc.{domain}");
    let records = bounded(query_timeout, resolver.txt_lookup(dmarc_target.as_str())).await?;
    let dmarc = records.iter().map(|r| r.to_string()).find(|r| r.contains("v=DMARC1"));
    debug!(target = %dmarc_target, found = dmarc.is_some(), "DMARC lookup finished.");
    dmarc.ok_or(ProbeFailure::NoData)
}

async fn lookup_mx(resolver: &TokioAsyncResolver, domain: &str, query_timeout: Duration) -> ProbeResult<Vec<String>> {
    let lookup = bounded(query_timeout, resolver.mx_lookup(domain)).await?;
    let mut exchangers: Vec<(u16, String)> = lookup
        .iter()
        .map(|mx| (mx.preference(), mx.exchange().to_utf8().trim_end_matches('.').to_string()))
        .collect();
    exchangers.sort();
    if exchangers.is_empty() {
        return Err(ProbeFailure::NoData);
    }
    Ok(exchangers.into_iter().map(|(_, host)| host).collect())
}

/// Applies our own bound on top of the resolver's and tags the failure.
pub(super) async fn bounded<T, F>(limit: Duration, lookup: F) -> ProbeResult<T>
where
    F: Future<Output = Result<T, ResolveError>>,
{
    match timeout(limit, lookup).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(classify_resolve_error(&e)),
        Err(_) => Err(ProbeFailure::Timeout),
    }
}

fn classify_resolve_error(err: &ResolveError) -> ProbeFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } if *response_code == ResponseCode::NXDomain => {
            ProbeFailure::NoSuchDomain
        }
        ResolveErrorKind::NoRecordsFound { .. } => ProbeFailure::NoData,
        ResolveErrorKind::Timeout => ProbeFailure::Timeout,
        _ => {
            debug!(error = %err, "Resolver error.");
            ProbeFailure::Protocol("DNS query failed".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_errors_are_tagged() {
        assert_eq!(classify_resolve_error(&ResolveErrorKind::Timeout.into()), ProbeFailure::Timeout);
        assert!(matches!(
            classify_resolve_error(&ResolveErrorKind::Message("socket closed").into()),
            ProbeFailure::Protocol(_)
        ));
    }

    #[tokio::test]
    async fn stalled_lookup_is_cut_off() {
        let stalled = std::future::pending::<Result<(), ResolveError>>();
        let outcome = bounded(Duration::from_millis(20), stalled).await;
        assert_eq!(outcome, Err(ProbeFailure::Timeout));
    }
}
