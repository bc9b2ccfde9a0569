pub mod documents;
pub mod health;
pub mod models;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Every HTTP and WebSocket route, without middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(documents::router())
        .merge(models::router())
        .route("/ws", get(ws::ws_handler))
}
