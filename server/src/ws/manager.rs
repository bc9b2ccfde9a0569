use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// A single browser connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: DateTime<Utc>,
}

/// Tracks every open WebSocket connection.
///
/// Wrapped in `Arc` and shared between the upgrade handler, the event
/// bridge and the heartbeat task.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a connection and returns the receiver for its outbound
    /// messages.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            connected_at: Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let open_for = Utc::now() - conn.connected_at;
            tracing::debug!(
                conn_id,
                seconds = open_for.num_seconds(),
                "WebSocket connection removed"
            );
        }
    }

    /// Sends a message to every connection.
    ///
    /// Closed channels are skipped; their connections are removed when
    /// their receive loop ends. Returns how many channels accepted it.
    pub async fn broadcast(&self, message: Message) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Sends a Close frame to every connection, then clears the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Sends a Ping frame to every connection.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
