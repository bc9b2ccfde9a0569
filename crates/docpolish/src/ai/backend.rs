//! The seam between the pipeline and the LLM service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::BackendError;

/// Sampling options for a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl GenerateOptions {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model_name.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}

/// A model known to the LLM service.
///
/// Fields the service reports beyond the name are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ModelInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: serde_json::Map::new(),
        }
    }
}

/// Text generation and model management offered by an LLM service.
///
/// Calls may take minutes. Callers that need a bound on completion time
/// must impose their own timeout.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
        -> Result<String, BackendError>;

    /// Lists the models currently available on the service.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError>;

    /// Downloads `name` onto the service.
    async fn pull_model(&self, name: &str) -> Result<(), BackendError>;
}
