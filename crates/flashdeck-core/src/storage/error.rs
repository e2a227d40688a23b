//! Storage error types

use thiserror::Error;

use crate::card::{CardId, Collection};

/// Errors that can occur during card store operations
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend cannot be opened (no IndexedDB, unreadable database file, ...)
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A card with this id already exists in the collection
    #[error("card {id} already exists in {collection}")]
    DuplicateKey { collection: Collection, id: CardId },

    /// Card not found where an operation requires it
    #[error("card {id} not found in {collection}")]
    NotFound { collection: Collection, id: CardId },

    /// known and unknown only connect through active
    #[error("card {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: CardId,
        from: Collection,
        to: Collection,
    },

    /// Storage backend error (database, browser API, filesystem)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
