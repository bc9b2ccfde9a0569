//! Frames sent to browser clients.
//!
//! Every frame is a JSON text message `{"event": NAME, "data": PAYLOAD}`.

use axum::extract::ws::Message;
use docpolish::JobEvent;
use serde::Serialize;
use serde_json::json;

/// Event names used on the socket.
pub mod event_names {
    pub const CONNECTED: &str = "connected";
    pub const DOCUMENT_UPDATE: &str = "document_update";
}

pub const CONNECTED_MESSAGE: &str = "Connected to document improvement service";

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    event: &'a str,
    data: T,
}

fn text_frame<T: Serialize>(event: &str, data: T) -> Result<Message, serde_json::Error> {
    let text = serde_json::to_string(&Envelope { event, data })?;
    Ok(Message::Text(text.into()))
}

/// Greeting sent once a socket is registered.
pub fn connected() -> Result<Message, serde_json::Error> {
    text_frame(
        event_names::CONNECTED,
        json!({ "message": CONNECTED_MESSAGE }),
    )
}

pub fn document_update(event: &JobEvent) -> Result<Message, serde_json::Error> {
    text_frame(event_names::DOCUMENT_UPDATE, event)
}
