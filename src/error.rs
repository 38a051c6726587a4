//! Error types for the I/O boundaries. None of these ever reach an
//! in-progress session: callers log them and fall back to defaults.

use thiserror::Error;

use crate::mode::TimeControlFilter;

/// Persistent storage failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Game-record retrieval failures
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no games available for time control {0}")]
    NoGames(TimeControlFilter),

    #[error("malformed game records: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("could not read game records: {0}")]
    Io(#[from] std::io::Error),

    #[error("bundled game records missing: {0}")]
    MissingAsset(String),
}

/// Share delivery failures; each one falls through to the next target
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("share target unavailable: {0}")]
    Unavailable(&'static str),

    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),
}
