//! Model listing and download on the LLM service.

use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use super::backend::{LlmBackend, ModelInfo};
use crate::config::LlmConfig;
use crate::error::BackendError;

/// Errors that can occur during model management.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Models on the service alongside the one generation uses.
#[derive(Debug, Clone, Serialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
    pub current_model: String,
}

/// A model that was pulled on request.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedModel {
    pub message: String,
    pub model_name: String,
}

/// What [`ModelManager::auto_load`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoLoadOutcome {
    /// The service already had models; nothing was pulled.
    AlreadyAvailable { models: Vec<ModelInfo> },
    /// The service had none, so the default model was pulled.
    Loaded { model_name: String },
}

impl AutoLoadOutcome {
    pub fn message(&self) -> String {
        match self {
            AutoLoadOutcome::AlreadyAvailable { models } => {
                format!("Found {} models already available", models.len())
            }
            AutoLoadOutcome::Loaded { model_name } => {
                format!("Default model {} loaded successfully", model_name)
            }
        }
    }
}

/// Manages which models the LLM service has.
#[derive(Clone)]
pub struct ModelManager {
    backend: Arc<dyn LlmBackend>,
    default_model: String,
}

impl ModelManager {
    /// Creates a new model manager.
    pub fn new(backend: Arc<dyn LlmBackend>, default_model: impl Into<String>) -> Self {
        Self {
            backend,
            default_model: default_model.into(),
        }
    }

    /// Creates a model manager from LLM config.
    pub fn from_config(backend: Arc<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, &config.model_name)
    }

    /// The model used for generation.
    pub fn current_model(&self) -> &str {
        &self.default_model
    }

    pub async fn list(&self) -> Result<ModelList, ModelError> {
        let models = self.backend.list_models().await?;
        debug!(
            "Found {} models: {:?}",
            models.len(),
            models.iter().map(|m| m.name.as_str()).collect::<Vec<_>>()
        );

        Ok(ModelList {
            models,
            current_model: self.default_model.clone(),
        })
    }

    /// Pulls `name`, or the default model when none is given.
    pub async fn load(&self, name: Option<&str>) -> Result<LoadedModel, ModelError> {
        let model_name = match name.map(str::trim) {
            Some("") => return Err(ModelError::EmptyName),
            Some(name) => name.to_string(),
            None => self.default_model.clone(),
        };

        info!("Loading model: {}", model_name);
        self.backend.pull_model(&model_name).await?;

        Ok(LoadedModel {
            message: format!("Model {} loaded successfully", model_name),
            model_name,
        })
    }

    /// Pulls the default model only if the service has no models at all.
    pub async fn auto_load(&self) -> Result<AutoLoadOutcome, ModelError> {
        let models = self.backend.list_models().await?;
        if !models.is_empty() {
            info!("Found {} models, no need to load", models.len());
            return Ok(AutoLoadOutcome::AlreadyAvailable { models });
        }

        info!(
            "No models found, loading default model: {}",
            self.default_model
        );
        self.backend.pull_model(&self.default_model).await?;

        Ok(AutoLoadOutcome::Loaded {
            model_name: self.default_model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::stub::StubBackend;

    fn manager(stub: Arc<StubBackend>) -> ModelManager {
        ModelManager::new(stub, "codellama:7b")
    }

    #[tokio::test]
    async fn test_list_reports_current_model() {
        let stub = Arc::new(StubBackend::reply("x").with_models(&["llama3", "mistral"]));
        let list = manager(stub).list().await.unwrap();

        assert_eq!(list.current_model, "codellama:7b");
        let names: Vec<&str> = list.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3", "mistral"]);
    }

    #[tokio::test]
    async fn test_load_named_model() {
        let stub = Arc::new(StubBackend::reply("x"));
        let loaded = manager(Arc::clone(&stub)).load(Some("mistral")).await.unwrap();

        assert_eq!(loaded.model_name, "mistral");
        assert_eq!(loaded.message, "Model mistral loaded successfully");
        assert_eq!(stub.pulled(), vec!["mistral".to_string()]);
    }

    #[tokio::test]
    async fn test_load_defaults_to_configured_model() {
        let stub = Arc::new(StubBackend::reply("x"));
        let loaded = manager(Arc::clone(&stub)).load(None).await.unwrap();
        assert_eq!(loaded.model_name, "codellama:7b");
    }

    #[tokio::test]
    async fn test_load_rejects_blank_name() {
        let stub = Arc::new(StubBackend::reply("x"));
        let result = manager(Arc::clone(&stub)).load(Some("  ")).await;
        assert!(matches!(result, Err(ModelError::EmptyName)));
        assert!(stub.pulled().is_empty());
    }

    #[tokio::test]
    async fn test_auto_load_skips_when_models_exist() {
        let stub = Arc::new(StubBackend::reply("x").with_models(&["llama3"]));
        let outcome = manager(Arc::clone(&stub)).auto_load().await.unwrap();

        assert!(matches!(outcome, AutoLoadOutcome::AlreadyAvailable { ref models } if models.len() == 1));
        assert_eq!(outcome.message(), "Found 1 models already available");
        assert!(stub.pulled().is_empty());
    }

    #[tokio::test]
    async fn test_auto_load_pulls_default_when_empty() {
        let stub = Arc::new(StubBackend::reply("x"));
        let outcome = manager(Arc::clone(&stub)).auto_load().await.unwrap();

        assert_eq!(
            outcome,
            AutoLoadOutcome::Loaded {
                model_name: "codellama:7b".to_string()
            }
        );
        assert_eq!(stub.pulled(), vec!["codellama:7b".to_string()]);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let stub = Arc::new(StubBackend::failing(BackendError::Timeout(300)));
        let result = manager(stub).load(Some("llama3")).await;
        assert!(matches!(result, Err(ModelError::Backend(BackendError::Timeout(300)))));
    }
}
