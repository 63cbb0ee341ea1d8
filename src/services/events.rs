use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dao::models::ScoreBoard,
    dto::events::{ScoreUpdateEvent, ServerEvent, WinnerDeclaredEvent},
    state::SharedState,
};

pub const EVENT_SCORE_UPDATE: &str = "score_update";
pub const EVENT_WINNER_DECLARED: &str = "winner_declared";

/// Build the `score_update` event carrying the full document.
pub fn score_update_event(board: &ScoreBoard) -> Option<ServerEvent> {
    encode(
        EVENT_SCORE_UPDATE,
        &ScoreUpdateEvent {
            data: board.clone(),
        },
    )
}

/// Broadcast the committed scoreboard to every viewer.
pub fn broadcast_score_update(state: &SharedState, board: &ScoreBoard) {
    if let Some(event) = score_update_event(board) {
        publish(state, event);
    }
}

/// Broadcast the declared winner token on its own.
pub fn broadcast_winner_declared(state: &SharedState, winner: Option<&str>) {
    let payload = WinnerDeclaredEvent {
        winner: winner.map(str::to_string),
    };
    if let Some(event) = encode(EVENT_WINNER_DECLARED, &payload) {
        publish(state, event);
    }
}

fn publish(state: &SharedState, event: ServerEvent) {
    let name = event.event.clone();
    let reached = state.hub().broadcast(event);
    debug!(event = %name, subscribers = reached, "published viewer event");
}

fn encode<T: Serialize>(name: &str, payload: &T) -> Option<ServerEvent> {
    match ServerEvent::json(name, payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event = name, error = %err, "failed to serialise viewer event");
            None
        }
    }
}
