pub mod hub;

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        scoreboard_store::{JsonFileStore, MemoryStore, ScoreboardStore},
        visit_log::VisitLog,
    },
    services::geolocation::{GeoError, GeoLocator, IpApiLocator},
};

pub use self::hub::EventHub;

pub type SharedState = Arc<AppState>;

/// Number of events a viewer may fall behind before it starts skipping.
const HUB_CAPACITY: usize = 16;

#[derive(Clone, Debug)]
/// Bookkeeping for a connected viewer socket.
pub struct ViewerConnection {
    pub id: Uuid,
    pub connected_at: SystemTime,
}

#[derive(Clone, Debug)]
/// An authenticated admin browser session.
pub struct AdminSession {
    pub username: String,
    pub created_at: SystemTime,
}

/// Central application state shared by every handler.
pub struct AppState {
    config: Arc<AppConfig>,
    store: Arc<dyn ScoreboardStore>,
    visits: VisitLog,
    locator: Arc<dyn GeoLocator>,
    hub: EventHub,
    viewers: DashMap<Uuid, ViewerConnection>,
    sessions: DashMap<String, AdminSession>,
    write_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ScoreboardStore>,
        locator: Arc<dyn GeoLocator>,
    ) -> SharedState {
        let visits = VisitLog::new(config.visits_path.clone());
        Arc::new(Self {
            config: Arc::new(config),
            store,
            visits,
            locator,
            hub: EventHub::new(HUB_CAPACITY),
            viewers: DashMap::new(),
            sessions: DashMap::new(),
            write_gate: Mutex::new(()),
        })
    }

    /// Build the production state: file or memory store and the ip-api locator.
    pub fn from_config(config: AppConfig) -> Result<SharedState, GeoError> {
        let store: Arc<dyn ScoreboardStore> = if config.in_memory {
            info!("keeping scoreboard in memory");
            Arc::new(MemoryStore::new())
        } else {
            info!(path = %config.scoreboard_path.display(), "persisting scoreboard to file");
            Arc::new(JsonFileStore::new(config.scoreboard_path.clone()))
        };
        let locator = IpApiLocator::new(&config.geolocation_base_url, config.geolocation_timeout)?;
        Ok(Self::new(config, store, Arc::new(locator)))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Persistence backend for the scoreboard document.
    pub fn store(&self) -> &Arc<dyn ScoreboardStore> {
        &self.store
    }

    pub fn visits(&self) -> &VisitLog {
        &self.visits
    }

    pub fn locator(&self) -> &Arc<dyn GeoLocator> {
        &self.locator
    }

    /// Broadcast hub used by both viewer transports.
    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Registry of connected viewer sockets keyed by their identifier.
    pub fn viewers(&self) -> &DashMap<Uuid, ViewerConnection> {
        &self.viewers
    }

    /// Live admin sessions keyed by their cookie token.
    pub fn sessions(&self) -> &DashMap<String, AdminSession> {
        &self.sessions
    }

    /// Serialise load-modify-save cycles so in-process writers cannot interleave.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }
}
