use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::get,
};

use crate::{services::websocket_service, state::SharedState};

/// Viewers only ever send `{"type":"refresh"}`.
const VIEWER_MAX_MESSAGE: usize = 4 * 1024;

#[utoipa::path(
    get,
    path = "/ws",
    tag = "viewers",
    responses((status = 101, description = "Switching protocols to a live scoreboard feed"))
)]
/// Hand the connection to the viewer session loop once upgraded.
pub async fn ws_handler(State(state): State<SharedState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade
        .max_message_size(VIEWER_MAX_MESSAGE)
        .on_upgrade(move |socket| websocket_service::handle_socket(state, socket))
}

/// Live scoreboard feed for viewer pages.
pub fn router() -> Router<SharedState> {
    Router::new().route("/ws", get(ws_handler))
}
