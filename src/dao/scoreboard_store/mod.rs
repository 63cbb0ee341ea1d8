mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use futures::future::BoxFuture;

use crate::dao::{models::ScoreBoard, storage::StorageResult};

/// Persistence seam for the single scoreboard document.
///
/// `load` never fails: absent or damaged storage yields a repaired default document.
/// `save` replaces the whole document; the last save wins.
pub trait ScoreboardStore: Send + Sync {
    fn load(&self) -> BoxFuture<'static, ScoreBoard>;
    fn save(&self, board: ScoreBoard) -> BoxFuture<'static, StorageResult<()>>;
}
