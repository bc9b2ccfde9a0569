use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use docpolish::{Job, JobId, JobResult, Receipt, SubmissionError, ValidationError};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the uploaded document.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct IngestUrlRequest {
    pub url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/documents", get(list_documents))
        .route("/api/documents/upload", post(upload_document))
        .route("/api/documents/ingest-url", post(ingest_url))
        .route("/api/documents/{id}", get(get_document))
        .route("/api/documents/{id}/result", get(get_result))
}

async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Receipt>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await?;
        tracing::debug!(size = bytes.len(), "Received upload");

        let receipt = state.service.submit_upload(&filename, bytes).await?;
        return Ok(Json(receipt));
    }

    Err(SubmissionError::from(ValidationError::MissingFile).into())
}

async fn ingest_url(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Receipt>> {
    // A missing or unparsable body is reported the same way as a missing URL.
    let url = serde_json::from_slice::<IngestUrlRequest>(&body)
        .ok()
        .and_then(|request| request.url);

    let receipt = state
        .service
        .submit_url(url.as_deref())
        .await
        .map_err(|e| match e {
            SubmissionError::Extraction(e) => AppError::UrlExtraction(e.to_string()),
            other => other.into(),
        })?;
    Ok(Json(receipt))
}

async fn list_documents(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.service.list())
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Job>> {
    Ok(Json(state.service.status(&JobId::from(id))?))
}

async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobResult>> {
    Ok(Json(state.service.result(&JobId::from(id))?))
}
