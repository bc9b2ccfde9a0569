use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use docpolish::ai::{AutoLoadOutcome, LoadedModel, ModelInfo, ModelList};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoadModelRequest {
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AutoLoadResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl From<AutoLoadOutcome> for AutoLoadResponse {
    fn from(outcome: AutoLoadOutcome) -> Self {
        let message = outcome.message();
        match outcome {
            AutoLoadOutcome::AlreadyAvailable { models } => Self {
                message,
                models: Some(models),
                model_name: None,
            },
            AutoLoadOutcome::Loaded { model_name } => Self {
                message,
                models: None,
                model_name: Some(model_name),
            },
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/models", get(list_models))
        .route("/api/models/load", post(load_model))
        .route("/api/models/auto-load", post(auto_load_model))
}

async fn list_models(State(state): State<AppState>) -> AppResult<Json<ModelList>> {
    let list = state
        .service
        .models()
        .list()
        .await
        .map_err(|e| AppError::model("Failed to connect to LLM service", e))?;
    Ok(Json(list))
}

async fn load_model(State(state): State<AppState>, body: Bytes) -> AppResult<Json<LoadedModel>> {
    let request = if body.is_empty() {
        LoadModelRequest::default()
    } else {
        serde_json::from_slice::<LoadModelRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let loaded = state
        .service
        .models()
        .load(request.model_name.as_deref())
        .await
        .map_err(|e| AppError::model("Failed to load model", e))?;
    Ok(Json(loaded))
}

async fn auto_load_model(State(state): State<AppState>) -> AppResult<Json<AutoLoadResponse>> {
    let outcome = state
        .service
        .models()
        .auto_load()
        .await
        .map_err(|e| AppError::model("Failed to auto-load model", e))?;
    Ok(Json(outcome.into()))
}
