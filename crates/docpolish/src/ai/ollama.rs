//! Ollama HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::backend::{GenerateOptions, LlmBackend, ModelInfo};
use crate::config::LlmConfig;
use crate::error::BackendError;

/// Keeps error bodies from flooding logs and job records.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        Some((idx, _)) => format!("{}... (truncated)", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Talks to an Ollama server over its REST API.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    generate_timeout: Duration,
    list_timeout: Duration,
    pull_timeout: Duration,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::from_config(&LlmConfig {
            service_url: base_url.into(),
            ..LlmConfig::default()
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BackendError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            generate_timeout: Duration::from_secs(config.timeout_secs),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            pull_timeout: Duration::from_secs(config.pull_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("LLM service returned HTTP {}", status.as_u16());
        Err(BackendError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        })
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, BackendError> {
        let request = GenerateRequest {
            model: &options.model,
            prompt,
            stream: false,
            options: SamplingOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.max_tokens,
            },
        };

        debug!(
            "Sending generate request to {} (model {}, prompt {} chars)",
            self.base_url,
            options.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(self.generate_timeout)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body: GenerateResponse = response.json().await?;

        debug!("LLM response received, {} chars", body.response.len());
        Ok(body.response)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.list_timeout)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let tags: TagsResponse = response.json().await?;

        debug!("LLM service reports {} models", tags.models.len());
        Ok(tags.models)
    }

    async fn pull_model(&self, name: &str) -> Result<(), BackendError> {
        info!("Pulling model {} from {}", name, self.base_url);

        let response = self
            .client
            .post(self.url("/api/pull"))
            .timeout(self.pull_timeout)
            .json(&PullRequest {
                name,
                stream: false,
            })
            .send()
            .await?;
        Self::check_status(response).await?;

        info!("Model {} pulled", name);
        Ok(())
    }
}
