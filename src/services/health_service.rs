use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness along with the size of the viewer fan-out.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.viewers().len(), state.hub().subscriber_count())
}
