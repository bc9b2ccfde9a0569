//! docpolish HTTP server library.
//!
//! Exposes config, state, error handling, routes and the WebSocket
//! infrastructure so integration tests and the binary build the same app.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod ws;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the router with the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.service.config().ingestion.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = build_cors_layer(&state.config);

    routes::api_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
