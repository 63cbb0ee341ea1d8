//! Payloads pushed to viewers over the WebSocket and SSE channels.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::dao::models::ScoreBoard;

#[derive(Clone, Debug, PartialEq)]
/// Dispatched payload carried across the broadcast hub.
pub struct ServerEvent {
    pub event: String,
    pub payload: Value,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Convenience wrapper that serialises `payload` into the event body.
    pub fn json<T>(event: impl Into<String>, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self::new(event, serde_json::to_value(payload)?))
    }

    /// Text frame sent to WebSocket viewers: `{"event": name, "payload": body}`.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(&Frame {
            event: &self.event,
            payload: &self.payload,
        })
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    event: &'a str,
    payload: &'a Value,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after every committed write with the full new document.
pub struct ScoreUpdateEvent {
    pub data: ScoreBoard,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the admin declares (or clears) the winner.
pub struct WinnerDeclaredEvent {
    pub winner: Option<String>,
}
