// src/core/probes/hosting_probe.rs

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, info};

use super::dns_probe::bounded;
use crate::core::error::ProbeFailure;
use crate::core::models::ProbeResult;

/// PTR hostname of `ip`, without the trailing dot. Only the first answer is used.
pub async fn reverse_lookup(resolver: &TokioAsyncResolver, ip: IpAddr, limit: Duration) -> ProbeResult<String> {
    info!(%ip, "Starting reverse DNS probe.");
    let lookup = bounded(limit, resolver.reverse_lookup(ip)).await?;
    let hostname = lookup
        .iter()
        .next()
        .map(|ptr| ptr.to_string().trim_end_matches('.').to_string())
        .filter(|host| !host.is_empty());
    debug!(%ip, hostname = ?hostname, "Reverse DNS finished.");
    hostname.ok_or(ProbeFailure::NoData)
}
