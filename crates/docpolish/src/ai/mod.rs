//! LLM backends and model management.
//!
//! [`OllamaBackend`] talks to a real service; [`StubBackend`] answers
//! in-process and is what the test suites run against.

pub mod backend;
pub mod model_manager;
pub mod ollama;
pub mod stub;

pub use backend::{GenerateOptions, LlmBackend, ModelInfo};
pub use model_manager::{AutoLoadOutcome, LoadedModel, ModelError, ModelList, ModelManager};
pub use ollama::OllamaBackend;
pub use stub::{StubBackend, StubBehavior};
