//! Translation requests and results

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};

/// Longest input accepted, in characters.
pub const MAX_CHARS: usize = 40;

/// Shortest input accepted, in characters after trimming.
pub const MIN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Reject input the front-end would never send: blank or single
    /// characters, and anything over [`MAX_CHARS`].
    pub fn validate(&self) -> Result<()> {
        let len = self.text.chars().count();
        if len > MAX_CHARS {
            return Err(TranslateError::TooLong {
                len,
                max: MAX_CHARS,
            });
        }
        if self.text.trim().chars().count() < MIN_CHARS {
            return Err(TranslateError::TooShort);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
}
