//! Error type shared by the persistence, config and backup layers.
//!
//! The review services themselves never surface these to callers; they are
//! turned into [`crate::diagnostics::PersistenceIssue`]s and logged instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unknown question category: {0}")]
    UnknownCategory(String),
    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
