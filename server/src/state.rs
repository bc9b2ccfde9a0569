use std::sync::Arc;

use docpolish::DocumentService;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Submission, status and model operations.
    pub service: Arc<DocumentService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Open WebSocket connections.
    pub ws_manager: Arc<WsManager>,
}
