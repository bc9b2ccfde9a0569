use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobId, JobState};

#[derive(Error, Debug)]
pub enum DocpolishError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },
}

/// Rejected input at submission time. No job is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file provided")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("File type not allowed")]
    FileTypeNotAllowed { extension: String },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("URL not provided")]
    MissingUrl,

    #[error("URL cannot be empty")]
    EmptyUrl,

    #[error("Invalid URL format. Must start with http:// or https://")]
    InvalidUrl(String),
}

/// Failure to turn a submitted source into plain text. No job is created.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Failed to fetch URL: {0}")]
    Fetch(String),

    #[error("URL returned HTTP {status}")]
    FetchStatus { status: u16 },

    #[error("Content exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Extraction task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Document not found: {0}")]
    NotFound(JobId),

    #[error("Document processing not completed")]
    NotReady { id: JobId, state: JobState },

    #[error("Invalid transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobState,
        to: JobState,
    },

    #[error("Job {0} already has an executor")]
    AlreadyClaimed(JobId),
}

/// Failure talking to the LLM service. Recorded on the job, never retried.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("LLM service request failed: {0}")]
    Request(String),

    #[error("LLM service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM service returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("LLM service did not respond within {0} seconds")]
    Timeout(u64),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::InvalidResponse(e.to_string())
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

/// Why a submission produced no job, or a job that could not be started.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, DocpolishError>;
