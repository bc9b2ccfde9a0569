//! WebSocket push of job updates to browser clients.
//!
//! Provides connection management, the heartbeat, the event bridge and
//! the HTTP upgrade handler.

mod bridge;
mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;

pub use bridge::start_event_bridge;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
