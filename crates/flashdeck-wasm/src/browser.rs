//! Browser WASM bindings using wasm-bindgen and IndexedDB storage
//!
//! Every mutation resolves to the deck as stored afterwards (a JSON
//! `{active, known, unknown}` object) so the front-end re-renders from the
//! store, never from its own copy.

use std::cell::RefCell;
use std::rc::Rc;

use flashdeck_core::{
    lifecycle, CardStore, LanguageFilter, LegacyMigrator, Settings, StoreError,
};
use flashdeck_indexeddb::{IndexedDbStore, LocalStorage, DEFAULT_DB_NAME};
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::{card_id, parse_card, parse_collection, to_json, BridgeError, PracticeResult};

// WASM is single-threaded; Rc lets exports hold the store across awaits.
thread_local! {
    static STORE: RefCell<Option<Rc<IndexedDbStore>>> = const { RefCell::new(None) };
    static MIGRATOR: Rc<LegacyMigrator> = Rc::new(LegacyMigrator::new());
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Initialize the IndexedDB store. Must be called before any storage operations.
/// Returns a Promise that resolves when initialization is complete.
#[wasm_bindgen]
pub async fn init_store(db_name: Option<String>) -> Result<(), JsValue> {
    // Route Rust panics to console.error instead of "RuntimeError: unreachable"
    console_error_panic_hook::set_once();

    if STORE.with(|s| s.borrow().is_some()) {
        return Err(BridgeError::AlreadyInitialized.into());
    }

    let name = db_name.unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
    let store = IndexedDbStore::open(&name)
        .await
        .map_err(|e| BridgeError::Store(e.into()))?;

    // Another init_store may have finished while this one awaited the open.
    STORE.with(|s| {
        let mut s = s.borrow_mut();
        if s.is_some() {
            store.close();
            return Err(BridgeError::AlreadyInitialized.into());
        }
        *s = Some(Rc::new(store));
        Ok(())
    })
}

fn get_store() -> Result<Rc<IndexedDbStore>, BridgeError> {
    STORE.with(|s| s.borrow().clone().ok_or(BridgeError::NotInitialized))
}

async fn deck_json<S: CardStore>(store: &S) -> Result<String, BridgeError> {
    to_json(&lifecycle::snapshot(store).await?)
}

/// Run the one-time legacy import from `window.localStorage`, then resolve
/// to the deck. Safe to call on every page load and from several entry
/// points at once.
#[wasm_bindgen]
pub async fn bootstrap() -> Result<String, JsValue> {
    let store = get_store()?;

    match LocalStorage::from_window() {
        Ok(legacy) => {
            let migrator = MIGRATOR.with(Rc::clone);
            match migrator.migrate(store.as_ref(), &legacy).await {
                Ok(_) => {}
                Err(StoreError::Serialization(e)) => {
                    warn!(error = %e, "malformed legacy data, skipping legacy import")
                }
                Err(e) => return Err(BridgeError::from(e).into()),
            }
        }
        Err(e) => warn!(error = %e, "localStorage unavailable, skipping legacy import"),
    }

    Ok(deck_json(store.as_ref()).await?)
}

/// All three collections.
#[wasm_bindgen]
pub async fn snapshot() -> Result<String, JsValue> {
    let store = get_store()?;
    Ok(deck_json(store.as_ref()).await?)
}

/// Accept a card (JSON) into practice.
#[wasm_bindgen]
pub async fn add_card(card_json: String) -> Result<String, JsValue> {
    let store = get_store()?;
    let card = parse_card(&card_json)?;
    lifecycle::add_card(store.as_ref(), card)
        .await
        .map_err(BridgeError::from)?;
    Ok(deck_json(store.as_ref()).await?)
}

/// Move a card to `active`, `known` or `unknown`.
#[wasm_bindgen]
pub async fn move_card(card_json: String, destination: String) -> Result<String, JsValue> {
    let store = get_store()?;
    let card = parse_card(&card_json)?;
    let destination = parse_collection(&destination)?;
    lifecycle::move_card(store.as_ref(), &card, destination)
        .await
        .map_err(BridgeError::from)?;
    Ok(deck_json(store.as_ref()).await?)
}

/// Delete a card from whichever collection holds it.
#[wasm_bindgen]
pub async fn delete_card(id: f64) -> Result<String, JsValue> {
    let store = get_store()?;
    lifecycle::delete_card(store.as_ref(), card_id(id)?)
        .await
        .map_err(BridgeError::from)?;
    Ok(deck_json(store.as_ref()).await?)
}

/// Move every known and unknown card back into active.
#[wasm_bindgen]
pub async fn reset_all() -> Result<String, JsValue> {
    let store = get_store()?;
    let deck = lifecycle::reset_all(store.as_ref())
        .await
        .map_err(BridgeError::from)?;
    Ok(to_json(&deck)?)
}

/// Move unknown cards matching `language` (default: the saved
/// `selectedLanguage`) back into active. Resolves to `{moved, deck}`.
#[wasm_bindgen]
pub async fn practice_unknown(language: Option<String>) -> Result<String, JsValue> {
    let store = get_store()?;
    let filter = match language {
        Some(language) => LanguageFilter::parse(&language),
        None => Settings::new(store.as_ref())
            .selected_language()
            .await
            .map_err(BridgeError::from)?,
    };

    let outcome = lifecycle::practice_unknown(store.as_ref(), &filter)
        .await
        .map_err(BridgeError::from)?;
    let result = PracticeResult {
        moved: outcome.moved(),
        deck: lifecycle::snapshot(store.as_ref())
            .await
            .map_err(BridgeError::from)?,
    };
    Ok(to_json(&result)?)
}

/// Read a setting as JSON, initializing it with `default_json` if absent.
#[wasm_bindgen]
pub async fn get_setting(key: String, default_json: String) -> Result<String, JsValue> {
    let store = get_store()?;
    let default: serde_json::Value =
        serde_json::from_str(&default_json).map_err(BridgeError::from)?;
    let value = Settings::new(store.as_ref())
        .get_or_init_value(&key, default)
        .await
        .map_err(BridgeError::from)?;
    Ok(to_json(&value)?)
}

/// Insert or replace a setting from its JSON text.
#[wasm_bindgen]
pub async fn save_setting(key: String, value_json: String) -> Result<(), JsValue> {
    let store = get_store()?;
    let value: serde_json::Value = serde_json::from_str(&value_json).map_err(BridgeError::from)?;
    Settings::new(store.as_ref())
        .save(&key, &value)
        .await
        .map_err(BridgeError::from)?;
    Ok(())
}

/// Distinct languages across every stored card, as a JSON array.
#[wasm_bindgen]
pub async fn available_languages() -> Result<String, JsValue> {
    let store = get_store()?;
    let deck = lifecycle::snapshot(store.as_ref())
        .await
        .map_err(BridgeError::from)?;
    Ok(to_json(&deck.languages())?)
}
