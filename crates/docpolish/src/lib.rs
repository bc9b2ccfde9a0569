pub mod ai;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod submission;

#[cfg(test)]
mod testing;

pub use ai::{LlmBackend, ModelManager, OllamaBackend, StubBackend};
pub use broadcast::{JobEvent, JobEventBroadcaster};
pub use config::{load_config, load_effective_config, Config, DocumentFormat};
pub use error::{
    BackendError, ConfigError, DocpolishError, ExtractionError, RegistryError, Result,
    SubmissionError, ValidationError,
};
pub use job::{Job, JobCounts, JobId, JobRegistry, JobResult, JobState, SourceKind, Transition};
pub use pipeline::{JobExecutor, JobTracker};
pub use submission::{DocumentService, Receipt};
