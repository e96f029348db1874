// src/core/probes/tls_probe.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, ProtocolVersion, SignatureScheme};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, error, info, warn};
use x509_parser::prelude::*;

use crate::core::error::ProbeFailure;
use crate::core::models::{CertificateFacts, ProbeResult};

/// Reads the leaf certificate and negotiated protocol of `domain:443`.
///
/// Runs on its own connection, independent of the HTTP probe. The whole
/// connect + handshake is bounded by `limit`.
pub async fn run_tls_probe(domain: &str, limit: Duration) -> ProbeResult<CertificateFacts> {
    info!(domain, "Starting TLS probe.");
    let outcome = match timeout(limit, handshake(domain)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(domain, seconds = limit.as_secs(), "TLS probe timed out.");
            Err(ProbeFailure::Timeout)
        }
    };
    match &outcome {
        Ok(facts) => info!(issuer = %facts.issuer, days_remaining = facts.days_remaining, "TLS probe finished."),
        Err(failure) => warn!(domain, %failure, "TLS information unavailable."),
    }
    outcome
}

async fn handshake(domain: &str) -> ProbeResult<CertificateFacts> {
    let connector = TlsConnector::from(Arc::new(inspection_config()?));
    let server_name = ServerName::try_from(domain.to_string()).map_err(|e| {
        error!(domain, error = %e, "Invalid TLS server name.");
        ProbeFailure::Protocol("invalid server name".into())
    })?;

    debug!(domain, "Connecting TCP stream to port 443.");
    let stream = TcpStream::connect((domain, 443)).await.map_err(|e| {
        debug!(error = %e, "TCP connection failed.");
        ProbeFailure::Unreachable
    })?;

    debug!(domain, "Performing TLS handshake.");
    let stream = connector.connect(server_name, stream).await.map_err(|e| {
        debug!(error = %e, "TLS handshake failed.");
        ProbeFailure::Protocol(format!("TLS handshake failed: {e}"))
    })?;

    let (_, connection) = stream.get_ref();
    let tls_version = describe_protocol(connection.protocol_version());
    let leaf = connection
        .peer_certificates()
        .and_then(|chain| chain.first())
        .ok_or(ProbeFailure::NoData)?;

    certificate_facts(leaf.as_ref(), tls_version, Utc::now())
}

/// Client config whose verifier accepts any chain, so expired or self-signed
/// certificates can still be inspected. Signatures are still checked.
fn inspection_config() -> ProbeResult<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| {
            error!(error = %e, "Failed to build TLS client config.");
            ProbeFailure::Protocol("TLS client configuration failed".into())
        })?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
        .with_no_client_auth();
    Ok(config)
}

/// Extracts issuer organization, subject CN and expiry from a DER certificate.
fn certificate_facts(der: &[u8], tls_version: String, now: DateTime<Utc>) -> ProbeResult<CertificateFacts> {
    let (_, x509) = parse_x509_certificate(der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate.");
        ProbeFailure::Protocol("unparseable certificate".into())
    })?;

    let issuer = first_attribute(x509.issuer().iter_organization())
        .or_else(|| first_attribute(x509.issuer().iter_common_name()))
        .unwrap_or_else(|| x509.issuer().to_string());
    let subject = first_attribute(x509.subject().iter_common_name()).unwrap_or_else(|| x509.subject().to_string());
    let not_after = asn1_time_to_chrono_utc(&x509.validity().not_after);
    let days_remaining = not_after.signed_duration_since(now).num_days();

    debug!(%issuer, %subject, %not_after, "Parsed leaf certificate.");
    Ok(CertificateFacts { issuer, subject, not_after, days_remaining, tls_version })
}

fn first_attribute<'a, 'b: 'a>(mut values: impl Iterator<Item = &'a AttributeTypeAndValue<'b>>) -> Option<String> {
    values.find_map(|attr| attr.as_str().ok()).map(str::to_string)
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

fn describe_protocol(version: Option<ProtocolVersion>) -> String {
    match version {
        Some(ProtocolVersion::TLSv1_3) => "TLSv1.3".to_string(),
        Some(ProtocolVersion::TLSv1_2) => "TLSv1.2".to_string(),
        Some(other) => format!("{other:?}"),
        None => "unknown".to_string(),
    }
}

#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_versions_are_named() {
        assert_eq!(describe_protocol(Some(ProtocolVersion::TLSv1_3)), "TLSv1.3");
        assert_eq!(describe_protocol(Some(ProtocolVersion::TLSv1_2)), "TLSv1.2");
        assert_eq!(describe_protocol(None), "unknown");
    }

    #[test]
    fn garbage_der_is_a_protocol_failure() {
        let outcome = certificate_facts(b"not a certificate", "TLSv1.3".into(), Utc::now());
        assert!(matches!(outcome, Err(ProbeFailure::Protocol(_))));
    }

    const ISSUED_LEAF: &[u8] = include_bytes!("testdata/issued_leaf.der");
    const CN_ONLY: &[u8] = include_bytes!("testdata/cn_only.der");

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn issuer_organization_and_subject_cn_are_read() {
        let facts = certificate_facts(ISSUED_LEAF, "TLSv1.3".into(), at("2026-12-15T18:54:23Z")).unwrap();
        assert_eq!(facts.issuer, "Sitelens Test CA");
        assert_eq!(facts.subject, "shop.example.com");
        assert_eq!(facts.not_after, at("2027-01-14T18:54:23Z"));
        assert_eq!(facts.days_remaining, 30);
        assert_eq!(facts.tls_version, "TLSv1.3");
    }

    #[test]
    fn issuer_falls_back_to_common_name() {
        let facts = certificate_facts(CN_ONLY, "TLSv1.2".into(), at("2026-11-01T00:00:00Z")).unwrap();
        assert_eq!(facts.issuer, "cn-only.example");
        assert_eq!(facts.subject, "cn-only.example");
        assert_eq!(facts.days_remaining, 14);
    }

    #[test]
    fn expired_certificate_has_negative_days() {
        let facts = certificate_facts(ISSUED_LEAF, "TLSv1.3".into(), at("2027-02-14T18:54:23Z")).unwrap();
        assert_eq!(facts.days_remaining, -31);
    }

    #[test]
    fn inspection_config_builds() {
        assert!(inspection_config().is_ok());
    }
}
