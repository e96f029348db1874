// src/core/probes/http_probe.rs

use std::error::Error as StdError;

use reqwest::header::{HeaderMap, ACCEPT_ENCODING, CONTENT_ENCODING};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::AnalyzerConfig;
use crate::core::error::ProbeFailure;
use crate::core::models::{HttpSnapshot, ProbeResult, Target};

/// What a browser would advertise; the server's choice shows up in `Content-Encoding`.
const ADVERTISED_ENCODINGS: &str = "gzip, deflate, br";

/// Why a single fetch attempt failed.
#[derive(Debug)]
enum FetchError {
    /// The server's certificate did not validate; worth one unverified retry.
    Certificate,
    Failed(ProbeFailure),
}

/// Fetches headers (HEAD, falling back to GET) and a bounded body prefix.
///
/// A certificate-validation failure is retried once with verification disabled;
/// the resulting snapshot is flagged with `verified_tls = false`. Every request
/// of the probe, retry included, shares one `http_timeout` budget.
pub async fn run_http_probe(target: &Target, config: &AnalyzerConfig) -> ProbeResult<HttpSnapshot> {
    info!(url = %target.url, "Starting HTTP probe.");

    let outcome = match timeout(config.http_timeout, fetch_with_retry(&target.url, config)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::Failed(ProbeFailure::Timeout)),
    };

    match outcome {
        Ok(snapshot) => {
            info!(
                final_url = %snapshot.final_url,
                status = snapshot.status,
                headers = snapshot.headers.len(),
                "HTTP probe finished."
            );
            Ok(snapshot)
        }
        Err(FetchError::Certificate) => {
            error!(url = %target.url, "TLS handshake failed even without certificate verification.");
            Err(ProbeFailure::Protocol("the TLS handshake failed even with certificate checks disabled".into()))
        }
        Err(FetchError::Failed(failure)) => {
            error!(url = %target.url, %failure, "HTTP probe failed.");
            Err(failure)
        }
    }
}

async fn fetch_with_retry(url: &str, config: &AnalyzerConfig) -> Result<HttpSnapshot, FetchError> {
    match fetch(url, config, true).await {
        Err(FetchError::Certificate) => {
            warn!(url, "Certificate verification failed, retrying without verification.");
            fetch(url, config, false).await
        }
        other => other,
    }
}

async fn fetch(url: &str, config: &AnalyzerConfig, verify_tls: bool) -> Result<HttpSnapshot, FetchError> {
    let client = build_client(config, verify_tls).map_err(|e| {
        error!(error = %e, "Failed to build HTTP client.");
        FetchError::Failed(ProbeFailure::Protocol("the HTTP client could not be initialised".into()))
    })?;

    debug!(url, verify_tls, "Sending HEAD request.");
    let head = client
        .head(url)
        .header(ACCEPT_ENCODING, ADVERTISED_ENCODINGS)
        .send()
        .await
        .map_err(|e| classify_fetch_error(&e))?;

    let (response, from_get) = if has_usable_headers(head.status(), head.headers()) {
        (head, false)
    } else {
        debug!(status = %head.status(), "HEAD rejected or empty, falling back to GET.");
        let get = client
            .get(url)
            .header(ACCEPT_ENCODING, ADVERTISED_ENCODINGS)
            .send()
            .await
            .map_err(|e| classify_fetch_error(&e))?;
        (get, true)
    };

    let mut snapshot = snapshot_from(&response, verify_tls);
    snapshot.body = if from_get && !is_encoded(response.headers()) {
        Some(read_body_prefix(response, config.body_limit).await)
    } else {
        // Content detection needs plain text, so ask again without compression.
        fetch_plain_body(&client, &snapshot.final_url, config.body_limit).await
    };
    Ok(snapshot)
}

async fn fetch_plain_body(client: &Client, url: &str, limit: usize) -> Option<String> {
    match client.get(url).header(ACCEPT_ENCODING, "identity").send().await {
        Ok(response) => Some(read_body_prefix(response, limit).await),
        Err(e) => {
            warn!(error = %e, "Body fetch failed, content detection will run on headers only.");
            None
        }
    }
}

fn build_client(config: &AnalyzerConfig, verify_tls: bool) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.http_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .danger_accept_invalid_certs(!verify_tls)
        .build()
}

fn has_usable_headers(status: StatusCode, headers: &HeaderMap) -> bool {
    !matches!(status, StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED) && !headers.is_empty()
}

fn is_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().eq_ignore_ascii_case("identity"))
}

fn snapshot_from(response: &Response, verified_tls: bool) -> HttpSnapshot {
    HttpSnapshot {
        final_url: response.url().to_string(),
        status: response.status().as_u16(),
        headers: response
            .headers()
            .iter()
            .map(|(name, value)| {
                (canonical_header_name(name.as_str()), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect(),
        body: None,
        verified_tls,
    }
}

/// Streams at most `limit` bytes of the body; the rest is never read.
///
/// A stream that breaks midway still yields what arrived before the break.
async fn read_body_prefix(mut response: Response, limit: usize) -> String {
    let mut buffer = Vec::with_capacity(limit.min(16 * 1024));
    while buffer.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => append_bounded(&mut buffer, &chunk, limit),
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, bytes = buffer.len(), "Body stream broke, keeping the prefix read so far.");
                break;
            }
        }
    }
    debug!(bytes = buffer.len(), "Read body prefix.");
    String::from_utf8_lossy(&buffer).into_owned()
}

fn append_bounded(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize) {
    let room = limit.saturating_sub(buffer.len());
    buffer.extend_from_slice(&chunk[..room.min(chunk.len())]);
}

/// `x-amz-cf-id` → `X-Amz-Cf-Id`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn classify_fetch_error(err: &reqwest::Error) -> FetchError {
    if is_certificate_error(err) {
        return FetchError::Certificate;
    }
    let failure = if err.is_timeout() {
        ProbeFailure::Timeout
    } else if err.is_redirect() {
        ProbeFailure::RedirectLoop
    } else if err.is_connect() {
        ProbeFailure::Unreachable
    } else if err.is_body() || err.is_decode() {
        ProbeFailure::Protocol("the response body could not be read".into())
    } else {
        ProbeFailure::Protocol("the server returned an invalid HTTP response".into())
    };
    debug!(error = %err, ?failure, "Classified HTTP transport error.");
    FetchError::Failed(failure)
}

/// Walks the error chain looking for a rustls certificate rejection.
fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(current) = source {
        if is_invalid_certificate(current) {
            return true;
        }
        // io::Error hides its payload from `source()`, so look inside explicitly.
        if let Some(inner) = current.downcast_ref::<std::io::Error>().and_then(|io| io.get_ref()) {
            if is_invalid_certificate(inner) {
                return true;
            }
        }
        source = current.source();
    }
    false
}

fn is_invalid_certificate(err: &(dyn StdError + 'static)) -> bool {
    matches!(err.downcast_ref::<rustls::Error>(), Some(rustls::Error::InvalidCertificate(_)))
}
