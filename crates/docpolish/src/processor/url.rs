//! Fetches web pages and reduces them to plain text.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;

use crate::config::IngestionConfig;
use crate::error::{ExtractionError, ValidationError};
use crate::sanitize;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-.,!?;:()]").unwrap());

/// Trims the URL and requires an http(s) scheme.
pub fn validate_url(raw: Option<&str>) -> Result<String, ValidationError> {
    let url = raw.ok_or(ValidationError::MissingUrl)?.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok(url.to_string())
}

/// Strips tags, collapses whitespace and drops everything but word
/// characters and basic punctuation.
pub fn html_to_text(html: &str) -> String {
    let text = RE_TAG.replace_all(html, "");
    let text = RE_WHITESPACE.replace_all(&text, " ");
    let text = RE_DISALLOWED.replace_all(&text, "");
    text.trim().to_string()
}

/// Downloads documents for URL ingestion.
pub struct UrlFetcher {
    client: Client,
    max_bytes: usize,
}

impl UrlFetcher {
    pub fn new(config: &IngestionConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.url_fetch_timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_upload_bytes,
        })
    }

    /// Fetches `url` and returns its text content.
    ///
    /// Bodies larger than the upload limit are rejected, whether or not the
    /// server announces a length.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractionError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractionError::Fetch(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::FetchStatus {
                status: status.as_u16(),
            });
        }

        let too_large = || ExtractionError::TooLarge {
            limit: self.max_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ExtractionError::Fetch(e.without_url().to_string()))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes);

        let text = html_to_text(&body);
        log::debug!(
            "Fetched {} bytes from {}, {} chars after cleanup",
            body.len(),
            sanitize::redact_url(url),
            text.len()
        );
        Ok(text)
    }
}
