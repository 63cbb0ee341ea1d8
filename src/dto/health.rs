use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process can answer.
    pub status: String,
    /// Viewers currently connected over WebSocket.
    pub viewers: usize,
    /// Receivers attached to the event hub (WebSocket and SSE).
    pub subscribers: usize,
}

impl HealthResponse {
    pub fn ok(viewers: usize, subscribers: usize) -> Self {
        Self {
            status: "ok".to_string(),
            viewers,
            subscribers,
        }
    }
}
