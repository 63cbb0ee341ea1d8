use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{models::ScoreBoard, scoreboard_store::ScoreboardStore, storage::StorageResult};

/// Process-local store, used when no file should be touched.
#[derive(Clone, Default)]
pub struct MemoryStore {
    board: Arc<RwLock<ScoreBoard>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document instead of the defaults.
    pub fn seeded(board: ScoreBoard) -> Self {
        Self {
            board: Arc::new(RwLock::new(board)),
        }
    }
}

impl ScoreboardStore for MemoryStore {
    fn load(&self) -> BoxFuture<'static, ScoreBoard> {
        let board = self.board.clone();
        Box::pin(async move { board.read().await.clone() })
    }

    fn save(&self, next: ScoreBoard) -> BoxFuture<'static, StorageResult<()>> {
        let board = self.board.clone();
        Box::pin(async move {
            *board.write().await = next;
            Ok(())
        })
    }
}
