use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "viewers",
    responses((status = 200, description = "Scoreboard event stream", content_type = "text/event-stream", body = String))
)]
/// Stream scoreboard events to one-way viewers, starting with the current state.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (initial, receiver) = sse_service::subscribe_viewer(&state).await;
    info!("New viewer SSE connection");
    sse_service::to_sse_stream(initial, receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
}
