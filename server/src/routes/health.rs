use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use docpolish::JobCounts;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub llm_service_url: String,
    pub model_name: String,
    pub version: &'static str,
    pub jobs: JobCounts,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}

/// Liveness of this process. Does not contact the LLM service.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm = &state.service.config().llm;
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        llm_service_url: llm.service_url.clone(),
        model_name: llm.model_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        jobs: state.service.counts(),
    })
}
