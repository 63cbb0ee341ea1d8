use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised while writing the scoreboard document or the visit log.
///
/// Reads never produce these: a document that cannot be read is replaced by defaults.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file (or its temporary sibling) could not be written or moved into place.
    #[error("failed to write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The in-memory value could not be encoded as JSON.
    #[error("failed to encode scoreboard document")]
    Encode(#[source] serde_json::Error),
}

impl StorageError {
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }
}
