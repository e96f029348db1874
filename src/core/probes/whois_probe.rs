// src/core/probes/whois_probe.rs

//! WHOIS over TCP port 43 (RFC 3912), with a single registrar referral hop.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::error::ProbeFailure;
use crate::core::models::{ProbeResult, WhoisRecord};

const IANA_SERVER: &str = "whois.iana.org";
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

const CREATED_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "registered on",
    "registration time",
    "domain registration date",
];
const EXPIRES_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires",
    "expires on",
    "paid-till",
];
const REGISTRAR_KEYS: &[&str] = &["registrar", "sponsoring registrar", "registrar name"];
const REFERRAL_KEYS: &[&str] = &["registrar whois server", "refer", "whois"];

/// Registration facts of `domain`. A leading `www.` is stripped first.
pub async fn run_whois_probe(domain: &str, limit: Duration) -> ProbeResult<WhoisRecord> {
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    info!(domain, "Starting WHOIS probe.");

    let outcome = match timeout(limit, lookup(domain)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ProbeFailure::Timeout),
    };
    match &outcome {
        Ok(record) => info!(registrar = ?record.registrar, created = ?record.created, "WHOIS probe finished."),
        Err(failure) => warn!(domain, %failure, "WHOIS information unavailable."),
    }
    outcome
}

async fn lookup(domain: &str) -> ProbeResult<WhoisRecord> {
    let server = whois_server_for(domain);
    let record = parse_response(&query(server, domain).await?);

    let referred = match record.referral.clone().filter(|r| !r.eq_ignore_ascii_case(server)) {
        Some(referral) => {
            debug!(%referral, "Following WHOIS referral.");
            Some(query(&referral, domain).await)
        }
        None => None,
    };
    resolve_referral(server, record, referred)
}

/// Combines the first answer with the referral server's, if one was asked.
///
/// IANA only describes the TLD, so when it was the first server its record is
/// never used for the domain: without a referral answer there is no data.
fn resolve_referral(
    server: &str,
    record: WhoisRecord,
    referred: Option<ProbeResult<String>>,
) -> ProbeResult<WhoisRecord> {
    let via_iana = server == IANA_SERVER;
    let record = match referred {
        Some(Ok(text)) if via_iana => parse_response(&text),
        Some(Ok(text)) => merge(record, parse_response(&text)),
        Some(Err(failure)) if via_iana => {
            debug!(%failure, "Registry behind IANA did not answer.");
            return Err(failure);
        }
        Some(Err(failure)) => {
            debug!(%failure, "Referral server did not answer, keeping registry data.");
            record
        }
        None if via_iana => return Err(ProbeFailure::NoData),
        None => record,
    };

    if record.created.is_none() && record.expires.is_none() && record.registrar.is_none() {
        return Err(ProbeFailure::NoData);
    }
    Ok(record)
}

async fn query(server: &str, domain: &str) -> ProbeResult<String> {
    debug!(server, domain, "Sending WHOIS query.");
    let mut stream = TcpStream::connect((server, 43)).await.map_err(|e| {
        debug!(server, error = %e, "WHOIS connection failed.");
        ProbeFailure::Unreachable
    })?;
    stream
        .write_all(format!("{domain}\r\n").as_bytes())
        .await
        .map_err(|e| ProbeFailure::Protocol(format!("WHOIS query failed: {e}")))?;

    let mut buffer = Vec::new();
    stream
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| ProbeFailure::Protocol(format!("WHOIS response unreadable: {e}")))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Registry server for the domain's TLD; IANA answers with a referral otherwise.
fn whois_server_for(domain: &str) -> &'static str {
    let tld = domain.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match tld.as_str() {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.nic.info",
        "io" => "whois.nic.io",
        "ai" => "whois.nic.ai",
        "co" => "whois.nic.co",
        "dev" | "app" => "whois.nic.google",
        "me" => "whois.nic.me",
        "us" => "whois.nic.us",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.nic.fr",
        "it" => "whois.nic.it",
        "nl" => "whois.domain-registry.nl",
        "br" => "whois.registro.br",
        "jp" => "whois.jprs.jp",
        "ru" => "whois.tcinet.ru",
        _ => IANA_SERVER,
    }
}

/// Keeps the first value seen for each field; later repeats are ignored.
fn parse_response(response: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if record.created.is_none() && CREATED_KEYS.contains(&key.as_str()) {
            record.created = parse_whois_date(value);
        } else if record.expires.is_none() && EXPIRES_KEYS.contains(&key.as_str()) {
            record.expires = parse_whois_date(value);
        } else if record.registrar.is_none() && REGISTRAR_KEYS.contains(&key.as_str()) {
            record.registrar = Some(value.to_string());
        } else if record.referral.is_none() && REFERRAL_KEYS.contains(&key.as_str()) {
            record.referral = referral_host(value);
        }
    }
    record
}

fn merge(registry: WhoisRecord, registrar: WhoisRecord) -> WhoisRecord {
    WhoisRecord {
        registrar: registry.registrar.or(registrar.registrar),
        created: registry.created.or(registrar.created),
        expires: registry.expires.or(registrar.expires),
        referral: registry.referral,
    }
}

/// `whois://whois.example.net/` → `whois.example.net`.
fn referral_host(value: &str) -> Option<String> {
    let host = value.split_once("://").map_or(value, |(_, rest)| rest);
    let host = host.trim_end_matches('/');
    (!host.is_empty() && !host.contains(char::is_whitespace)).then(|| host.to_ascii_lowercase())
}

/// Registries disagree on date formats; try the common ones in turn.
pub fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"];
    const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y"];

    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    // Dates are often followed by a timezone name or a note in parentheses.
    let first_token = value.split_whitespace().next().unwrap_or(value);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(first_token, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    debug!(value, "Unrecognised WHOIS date format.");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const VERISIGN_SAMPLE: &str = "\
   Domain Name: EXAMPLE.COM
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.iana.org
   Updated Date: 2024-08-14T07:01:34Z
   Creation Date: 1995-08-14T04:00:00Z
   Registry Expiry Date: 2025-08-13T04:00:00Z
   Registrar: RESERVED-Internet Assigned Numbers Authority
   Name Server: A.IANA-SERVERS.NET
>>> Last update of whois database: 2024-09-01T00:00:00Z <<<
";

    #[test]
    fn registry_response_is_parsed() {
        let record = parse_response(VERISIGN_SAMPLE);
        assert_eq!(record.created.map(|d| d.year()), Some(1995));
        assert_eq!(record.expires.map(|d| (d.year(), d.month(), d.day())), Some((2025, 8, 13)));
        assert_eq!(record.registrar.as_deref(), Some("RESERVED-Internet Assigned Numbers Authority"));
        assert_eq!(record.referral.as_deref(), Some("whois.iana.org"));
    }

    #[test]
    fn first_value_wins_for_repeated_keys() {
        let record = parse_response("created: 2001-02-03\ncreated: 2010-01-01\n");
        assert_eq!(record.created.map(|d| d.year()), Some(2001));
    }

    #[test]
    fn common_date_formats_are_understood() {
        for value in [
            "1997-09-15T04:00:00Z",
            "1997-09-15T07:00:00.000Z",
            "1997-09-15T04:00:00+0000",
            "1997-09-15 04:00:00",
            "1997-09-15",
            "15-Sep-1997",
            "15.09.1997",
            "1997-09-15 (YYYY-MM-DD)",
        ] {
            let parsed = parse_whois_date(value).unwrap_or_else(|| panic!("failed on {value}"));
            assert_eq!((parsed.year(), parsed.month(), parsed.day()), (1997, 9, 15), "{value}");
        }
        assert!(parse_whois_date("not a date").is_none());
    }

    #[test]
    fn servers_follow_the_tld() {
        assert_eq!(whois_server_for("example.com"), "whois.verisign-grs.com");
        assert_eq!(whois_server_for("example.ORG"), "whois.pir.org");
        assert_eq!(whois_server_for("example.xyz"), IANA_SERVER);
    }

    #[test]
    fn referral_hosts_are_cleaned() {
        assert_eq!(referral_host("whois://Whois.Example.net/").as_deref(), Some("whois.example.net"));
        assert_eq!(referral_host("not a host"), None);
    }

    const IANA_XYZ_SAMPLE: &str = "\
% IANA WHOIS server
domain:       XYZ
organisation: XYZ.COM LLC
whois:        whois.nic.xyz
status:       ACTIVE
created:      2014-03-20
source:       IANA
";

    #[test]
    fn iana_record_never_describes_the_domain() {
        let record = parse_response(IANA_XYZ_SAMPLE);
        assert_eq!(record.referral.as_deref(), Some("whois.nic.xyz"));
        assert!(record.created.is_some());

        let unanswered = resolve_referral(IANA_SERVER, record.clone(), Some(Err(ProbeFailure::Unreachable)));
        assert_eq!(unanswered, Err(ProbeFailure::Unreachable));
        assert_eq!(resolve_referral(IANA_SERVER, record, None), Err(ProbeFailure::NoData));
    }

    #[test]
    fn iana_referral_answer_replaces_tld_record() {
        let record = parse_response(IANA_XYZ_SAMPLE);
        let answer = "Creation Date: 2019-06-01T10:00:00Z\nRegistrar: Namecheap\n".to_string();
        let resolved = resolve_referral(IANA_SERVER, record, Some(Ok(answer))).unwrap();
        assert_eq!(resolved.created.map(|d| d.year()), Some(2019));
        assert_eq!(resolved.registrar.as_deref(), Some("Namecheap"));
    }

    #[test]
    fn registry_data_survives_a_silent_registrar() {
        let record = parse_response(VERISIGN_SAMPLE);
        let resolved = resolve_referral("whois.verisign-grs.com", record, Some(Err(ProbeFailure::Timeout))).unwrap();
        assert_eq!(resolved.created.map(|d| d.year()), Some(1995));
    }

    #[test]
    fn registry_fields_take_priority_when_merging() {
        let registry = parse_response("Creation Date: 2000-01-01\nRegistrar WHOIS Server: whois.r.net\n");
        let registrar = parse_response("Creation Date: 2005-01-01\nRegistrar: Example Registrar, Inc.\n");
        let merged = merge(registry, registrar);
        assert_eq!(merged.created.map(|d| d.year()), Some(2000));
        assert_eq!(merged.registrar.as_deref(), Some("Example Registrar, Inc."));
    }
}
