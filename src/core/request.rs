// src/core/request.rs

use serde::Deserialize;
use tracing::debug;

use crate::config::MAX_URL_LENGTH;
use crate::core::error::RequestError;

/// Inbound request body: `{ "url": "..." }`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()) }
    }

    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        serde_json::from_str(body).map_err(|e| {
            debug!(error = %e, "Rejected malformed request body.");
            RequestError::MalformedBody
        })
    }

    /// The URL to analyse, once the request contract is satisfied.
    pub fn validate(&self) -> Result<&str, RequestError> {
        let url = self.url.as_deref().map(str::trim).unwrap_or("");
        if url.is_empty() {
            return Err(RequestError::UrlRequired);
        }
        if url.chars().count() > MAX_URL_LENGTH {
            return Err(RequestError::UrlTooLong);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_url_is_required() {
        assert_eq!(AnalysisRequest::from_json("{}").unwrap().validate(), Err(RequestError::UrlRequired));
        assert_eq!(AnalysisRequest::new("   ").validate(), Err(RequestError::UrlRequired));
    }

    #[test]
    fn long_urls_are_rejected() {
        let long = format!("https://{}.com", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(AnalysisRequest::new(long).validate(), Err(RequestError::UrlTooLong));
    }

    #[test]
    fn json_body_is_parsed() {
        let request = AnalysisRequest::from_json(r#"{"url": " example.com "}"#).unwrap();
        assert_eq!(request.validate(), Ok("example.com"));
        assert_eq!(AnalysisRequest::from_json("not json"), Err(RequestError::MalformedBody));
    }
}
