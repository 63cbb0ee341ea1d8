/// Scoreboard document model and lenient decoding.
pub mod models;
/// Persistence backends for the scoreboard document.
pub mod scoreboard_store;
/// Storage error types shared by the backends.
pub mod storage;
/// Append-only visitor log.
pub mod visit_log;
