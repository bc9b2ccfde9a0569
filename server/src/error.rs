use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use docpolish::ai::ModelError;
use docpolish::{RegistryError, SubmissionError, ValidationError};

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{"error": ..., "code": ...}`
/// bodies. Messages for client mistakes match what the web frontend
/// already displays.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The multipart body could not be read, including when it exceeds the
    /// request body limit.
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// URL ingestion could not produce text.
    #[error("Failed to extract content from URL: {0}")]
    UrlExtraction(String),

    /// The LLM service rejected or failed a model operation.
    #[error("{context}: {source}")]
    Model {
        context: &'static str,
        #[source]
        source: ModelError,
    },

    #[error("{0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn model(context: &'static str, source: ModelError) -> Self {
        AppError::Model { context, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Submission(SubmissionError::Validation(e)) => match e {
                ValidationError::FileTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", e.to_string())
                }
                _ => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            },
            AppError::Submission(SubmissionError::Extraction(e)) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_ERROR", e.to_string())
            }
            AppError::Submission(SubmissionError::Registry(e)) | AppError::Registry(e) => {
                classify_registry_error(e)
            }
            AppError::Multipart(e) => {
                let status = e.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, e.body_text())
            }
            AppError::UrlExtraction(_) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_ERROR", self.to_string())
            }
            AppError::Model {
                source: ModelError::EmptyName,
                ..
            } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string()),
            AppError::Model { .. } => {
                tracing::warn!(error = %self, "Model operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_ERROR", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Unknown IDs map to 404 and unfinished jobs to 400. Anything else is an
/// internal invariant violation and is not described to the client.
fn classify_registry_error(err: &RegistryError) -> (StatusCode, &'static str, String) {
    match err {
        RegistryError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Document not found".to_string(),
        ),
        RegistryError::NotReady { .. } => (
            StatusCode::BAD_REQUEST,
            "NOT_READY",
            "Document processing not completed".to_string(),
        ),
        RegistryError::InvalidTransition { .. } | RegistryError::AlreadyClaimed(_) => {
            tracing::error!(error = %err, "Job registry invariant violated");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
