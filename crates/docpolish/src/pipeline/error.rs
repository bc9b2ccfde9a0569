use thiserror::Error;

use crate::error::BackendError;

/// Reasons a job ends in Failed. The display text is what clients see.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("No text content to improve")]
    EmptyText,

    #[error("Document too large: prompt is {len} characters, limit is {limit}")]
    PromptTooLong { len: usize, limit: usize },

    #[error("Error processing document: {0}")]
    Backend(#[from] BackendError),

    #[error("Error processing document: LLM backend panicked: {0}")]
    BackendPanicked(String),

    #[error("Executor is shutting down")]
    ShuttingDown,
}
