//! Error types for translation

use thiserror::Error;

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;

/// Errors that can occur while validating or performing a translation
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Fewer than two characters after trimming
    #[error("text too short to translate")]
    TooShort,

    /// Input over the character limit
    #[error("character limit exceeded ({len}/{max})")]
    TooLong { len: usize, max: usize },

    /// The service answered with an error, or with a body that has no translation
    #[error("translation failed: {0}")]
    Failed(String),

    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
