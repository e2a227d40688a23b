//! Error type for the command-line front-end.

use flashdeck_core::{CardId, StoreError};
use flashdeck_translate::TranslateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Card store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Translation error
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No collection holds this id
    #[error("no card with id {0}")]
    CardNotFound(CardId),
}

/// Result type alias using the CLI Error.
pub type Result<T> = std::result::Result<T, Error>;
