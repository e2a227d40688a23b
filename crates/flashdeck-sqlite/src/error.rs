//! Error types for SQLite storage backend

use flashdeck_core::storage::StoreError;
use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors that can occur during SQLite storage operations
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database file could not be opened or created
    #[error("cannot open database {path}: {reason}")]
    Open { path: String, reason: String },

    /// Database connection or query error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A status column holding something other than `known`/`unknown`
    #[error("invalid card status {0:?}")]
    InvalidStatus(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convert SqliteError to StoreError for the storage trait
impl From<SqliteError> for StoreError {
    fn from(err: SqliteError) -> Self {
        match err {
            e @ SqliteError::Open { .. } => StoreError::StorageUnavailable(e.to_string()),
            SqliteError::Json(e) => StoreError::Serialization(e.to_string()),
            e @ SqliteError::InvalidStatus(_) => StoreError::Serialization(e.to_string()),
            SqliteError::Database(e) => StoreError::Backend(format!("SQLite: {}", e)),
            SqliteError::Migration(msg) => StoreError::Backend(format!("Migration: {}", msg)),
        }
    }
}
