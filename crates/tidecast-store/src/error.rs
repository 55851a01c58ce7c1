//! Error types for tidecast-store.

use std::path::PathBuf;

/// Result type for tidecast-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tidecast-store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Database error from SQLite. A rejected write surfaces here.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored timestamp is outside the representable range.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
