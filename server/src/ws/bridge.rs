//! Relays job events from the pipeline onto every WebSocket connection.

use std::sync::Arc;

use docpolish::JobEvent;
use tokio::sync::broadcast::{self, error::RecvError};

use super::manager::WsManager;
use super::messages;

/// Spawns the task forwarding job events to connected clients.
///
/// Runs until the event channel closes. A lagging bridge drops the missed
/// events; clients reconcile through the status endpoint.
pub fn start_event_bridge(
    mut events: broadcast::Receiver<JobEvent>,
    ws_manager: Arc<WsManager>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        log::info!("Starting job event bridge");

        loop {
            match events.recv().await {
                Ok(event) => match messages::document_update(&event) {
                    Ok(message) => {
                        let delivered = ws_manager.broadcast(message).await;
                        log::debug!(
                            "Relayed {} update for {} to {} connections",
                            event.status,
                            event.job_id,
                            delivered
                        );
                    }
                    Err(e) => log::warn!("Failed to encode job event: {}", e),
                },
                Err(RecvError::Lagged(n)) => {
                    log::warn!("Job event bridge lagged, missed {} events", n);
                }
                Err(RecvError::Closed) => {
                    log::info!("Job event channel closed, stopping event bridge");
                    break;
                }
            }
        }
    })
}
