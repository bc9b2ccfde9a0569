//! Scriptable in-process backend.
//!
//! Lets the pipeline run without an LLM service: it replies with fixed
//! text, fails, or never answers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::backend::{GenerateOptions, LlmBackend, ModelInfo};
use crate::error::BackendError;

/// How [`StubBackend::generate`] responds.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Reply with this text.
    Reply(String),
    /// Reply with the prompt itself.
    Echo,
    /// Fail with this error.
    Fail(BackendError),
    /// Never reply.
    Hang,
    /// Panic inside generate.
    Panic(String),
}

pub struct StubBackend {
    behavior: StubBehavior,
    delay: Option<Duration>,
    models: Mutex<Vec<ModelInfo>>,
    prompts: Mutex<Vec<String>>,
    pulled: Mutex<Vec<String>>,
    generate_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubBackend {
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            models: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            pulled: Mutex::new(Vec::new()),
            generate_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(StubBehavior::Reply(text.into()))
    }

    pub fn failing(error: BackendError) -> Self {
        Self::new(StubBehavior::Fail(error))
    }

    pub fn hanging() -> Self {
        Self::new(StubBehavior::Hang)
    }

    pub fn panicking(message: impl Into<String>) -> Self {
        Self::new(StubBehavior::Panic(message.into()))
    }

    /// Waits this long before each generate reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_models(self, names: &[&str]) -> Self {
        if let Ok(mut models) = self.models.lock() {
            *models = names.iter().map(|n| ModelInfo::named(*n)).collect();
        }
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Highest number of generate calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn pulled(&self) -> Vec<String> {
        self.pulled.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmBackend for StubBackend {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<String, BackendError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            StubBehavior::Reply(text) => Ok(text.clone()),
            StubBehavior::Echo => Ok(prompt.to_string()),
            StubBehavior::Fail(error) => Err(error.clone()),
            StubBehavior::Hang => std::future::pending().await,
            StubBehavior::Panic(message) => panic!("{}", message),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        Ok(self.models.lock().map(|m| m.clone()).unwrap_or_default())
    }

    async fn pull_model(&self, name: &str) -> Result<(), BackendError> {
        if let StubBehavior::Fail(error) = &self.behavior {
            return Err(error.clone());
        }
        if let Ok(mut pulled) = self.pulled.lock() {
            pulled.push(name.to_string());
        }
        if let Ok(mut models) = self.models.lock() {
            if !models.iter().any(|m| m.name == name) {
                models.push(ModelInfo::named(name));
            }
        }
        Ok(())
    }
}
