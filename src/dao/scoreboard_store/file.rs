use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dao::{
    models::ScoreBoard,
    scoreboard_store::ScoreboardStore,
    storage::{StorageError, StorageResult},
};

/// Stores the scoreboard as a pretty-printed JSON file.
///
/// Saves go through a temporary sibling file that is renamed over the target, so a
/// reader sees either the previous document or the new one.
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> ScoreBoard {
        let path = self.path.as_path();
        match fs::read(path).await {
            Ok(bytes) => match ScoreBoard::repair_from_slice(&bytes) {
                Ok(board) => board,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "scoreboard document is malformed; using defaults"
                    );
                    ScoreBoard::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no scoreboard document yet; using defaults");
                ScoreBoard::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read scoreboard document; using defaults"
                );
                ScoreBoard::default()
            }
        }
    }

    async fn write_document(&self, board: &ScoreBoard) -> StorageResult<()> {
        let payload = serde_json::to_vec_pretty(board).map_err(StorageError::Encode)?;
        let path = self.path.as_path();

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::write(parent, source))?;
        }

        let staging = staging_path(path);
        if let Err(source) = fs::write(&staging, &payload).await {
            return Err(StorageError::write(staging, source));
        }
        if let Err(source) = fs::rename(&staging, path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::write(path, source));
        }
        Ok(())
    }
}

impl ScoreboardStore for JsonFileStore {
    fn load(&self) -> BoxFuture<'static, ScoreBoard> {
        let store = self.clone();
        Box::pin(async move { store.read_document().await })
    }

    fn save(&self, board: ScoreBoard) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write_document(&board).await })
    }
}

/// Unique hidden sibling of `path` used to stage a write before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "scoreboard.json".as_ref()));
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}
