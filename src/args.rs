// src/args.rs

use clap::Parser;

use crate::core::error::RequestError;
use crate::core::request::AnalysisRequest;

/// Website fingerprinting: CDN, CMS, hosting, security headers, TLS, WHOIS and email records.
///
/// Without arguments an interactive terminal UI starts. With `--url` or
/// `--request` one analysis runs and its JSON response is printed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Analyse this URL and print the JSON response.
    #[arg(short, long)]
    pub url: Option<String>,

    /// Analyse a raw request body such as '{"url": "example.com"}'.
    #[arg(short, long, conflicts_with = "url")]
    pub request: Option<String>,

    /// Pretty-print the JSON response.
    #[arg(short, long)]
    pub pretty: bool,
}

impl Args {
    /// The one-shot request, if any was given on the command line.
    pub fn headless_request(&self) -> Option<Result<AnalysisRequest, RequestError>> {
        if let Some(url) = &self.url {
            return Some(Ok(AnalysisRequest::new(url.clone())));
        }
        self.request.as_deref().map(AnalysisRequest::from_json)
    }
}
