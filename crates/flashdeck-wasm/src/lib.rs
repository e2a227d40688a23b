//! flashdeck WASM bridge
//!
//! Exposes the flashdeck-core lifecycle operations to a JavaScript
//! front-end. Values cross the boundary as JSON strings; failures reject
//! the returned promise with the error message.
//!
//! The `browser` feature enables the wasm-bindgen exports backed by
//! IndexedDB (see [`browser`]). The helpers in this module are the
//! boundary codec those exports share, and build on any target.

use flashdeck_core::{CardId, Collection, DeckSnapshot, Flashcard, StoreError};
use serde::Serialize;
use thiserror::Error;

#[cfg(feature = "browser")]
pub mod browser;

/// Largest integer a JS number holds exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Errors surfaced to JavaScript.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("store not initialized, call init_store() first")]
    NotInitialized,

    #[error("store already initialized")]
    AlreadyInitialized,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unknown collection {0:?}")]
    UnknownCollection(String),

    #[error("invalid card id {0}")]
    InvalidId(f64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Result of `practice_unknown` as sent to JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResult {
    /// Cards moved back into active; zero means there was nothing to do
    pub moved: usize,
    pub deck: DeckSnapshot,
}

/// Decode a card sent by the front-end.
pub fn parse_card(json: &str) -> Result<Flashcard> {
    Ok(serde_json::from_str(json)?)
}

/// Resolve a destination name such as `known` or `known-cards`.
pub fn parse_collection(name: &str) -> Result<Collection> {
    Collection::parse(name).ok_or_else(|| BridgeError::UnknownCollection(name.to_string()))
}

/// Card ids arrive as JS numbers; only exact integers are accepted.
pub fn card_id(id: f64) -> Result<CardId> {
    if id.is_finite() && id.fract() == 0.0 && id.abs() <= MAX_SAFE_INTEGER {
        Ok(id as CardId)
    } else {
        Err(BridgeError::InvalidId(id))
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
