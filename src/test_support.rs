//! Shared fixtures for unit tests.

use std::{net::IpAddr, sync::Arc};

use futures::future::BoxFuture;
use tempfile::TempDir;

use crate::{
    config::AppConfig,
    dao::{models::ScoreBoard, scoreboard_store::MemoryStore},
    services::geolocation::{GeoDetails, GeoError, GeoLocator},
    state::{AppState, SharedState},
};

/// Locator that answers instantly with a fixed result.
pub struct StubLocator {
    pub details: Option<GeoDetails>,
}

impl GeoLocator for StubLocator {
    fn locate(&self, ip: IpAddr) -> BoxFuture<'static, Result<GeoDetails, GeoError>> {
        let answer = self.details.clone().ok_or_else(|| GeoError::Rejected {
            ip,
            message: "stubbed failure".into(),
        });
        Box::pin(async move { answer })
    }
}

pub fn lisbon() -> GeoDetails {
    GeoDetails {
        location: "Lisbon, Lisbon, Portugal".into(),
        lat: "38.7223".into(),
        lon: "-9.1393".into(),
        isp: "Example Telecom".into(),
        timezone: "Europe/Lisbon".into(),
    }
}

/// State with an empty in-memory store; the visit log lives in the returned directory.
pub fn test_state() -> (SharedState, TempDir) {
    seeded_state(ScoreBoard::default())
}

pub fn seeded_state(board: ScoreBoard) -> (SharedState, TempDir) {
    state_with(board, AppConfig::default(), Some(lisbon()))
}

pub fn state_with(
    board: ScoreBoard,
    mut config: AppConfig,
    details: Option<GeoDetails>,
) -> (SharedState, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    config.visits_path = dir.path().join("visitors.log");
    config.scoreboard_path = dir.path().join("scoreboard.json");
    let state = AppState::new(
        config,
        Arc::new(MemoryStore::seeded(board)),
        Arc::new(StubLocator { details }),
    );
    (state, dir)
}
