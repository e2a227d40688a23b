//! Typed access to the settings collection
//!
//! `Settings` is a handle over a [`CardStore`] passed to whatever needs
//! preferences. Reads are read-through: a key that is absent is initialized
//! with the caller's default, so once read a setting always exists.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::language::LanguageFilter;
use crate::storage::{CardStore, StoreError, StoreResult};

/// Well-known setting keys.
pub mod keys {
    /// Practice view language filter (`"all"` or a language name)
    pub const SELECTED_LANGUAGE: &str = "selectedLanguage";
    /// Last source language code used for translation
    pub const SOURCE_LANGUAGE: &str = "sourceLanguage";
    /// Last target language code used for translation
    pub const TARGET_LANGUAGE: &str = "targetLanguage";
    /// Gate for the one-time legacy import
    pub const LEGACY_MIGRATED: &str = "localStorage_migrated";
}

const DEFAULT_SOURCE_LANGUAGE: &str = "source";
const DEFAULT_TARGET_LANGUAGE: &str = "target";

/// Settings view over a card store.
pub struct Settings<'a, S> {
    store: &'a S,
}

impl<'a, S: CardStore> Settings<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Stored value for `key`, or `default` after persisting it.
    ///
    /// A stored JSON `null` counts as absent. A stored value that does not
    /// decode as `T` is a `StoreError::Serialization`.
    pub async fn get_or_init<T>(&self, key: &str, default: T) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.store.setting(key).await? {
            Some(value) if !value.is_null() => serde_json::from_value(value)
                .map_err(|e| StoreError::Serialization(format!("setting {}: {}", key, e))),
            _ => {
                debug!(key, "initializing setting with default");
                self.store
                    .save_setting(key, serde_json::to_value(&default)?)
                    .await?;
                Ok(default)
            }
        }
    }

    /// Raw-JSON variant of [`Settings::get_or_init`].
    pub async fn get_or_init_value(&self, key: &str, default: Value) -> StoreResult<Value> {
        self.get_or_init(key, default).await
    }

    /// Insert or replace the value for `key`.
    pub async fn save<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        if value.is_null() {
            warn!(key, "saving null setting value; it will read back as absent");
        }
        self.store.save_setting(key, value).await
    }

    pub async fn selected_language(&self) -> StoreResult<LanguageFilter> {
        self.get_or_init(keys::SELECTED_LANGUAGE, LanguageFilter::All)
            .await
    }

    pub async fn set_selected_language(&self, filter: &LanguageFilter) -> StoreResult<()> {
        self.save(keys::SELECTED_LANGUAGE, filter).await
    }

    pub async fn source_language(&self) -> StoreResult<String> {
        self.get_or_init(keys::SOURCE_LANGUAGE, DEFAULT_SOURCE_LANGUAGE.to_string())
            .await
    }

    pub async fn set_source_language(&self, code: &str) -> StoreResult<()> {
        self.save(keys::SOURCE_LANGUAGE, code).await
    }

    pub async fn target_language(&self) -> StoreResult<String> {
        self.get_or_init(keys::TARGET_LANGUAGE, DEFAULT_TARGET_LANGUAGE.to_string())
            .await
    }

    pub async fn set_target_language(&self, code: &str) -> StoreResult<()> {
        self.save(keys::TARGET_LANGUAGE, code).await
    }

    pub async fn legacy_migrated(&self) -> StoreResult<bool> {
        self.get_or_init(keys::LEGACY_MIGRATED, false).await
    }

    pub async fn mark_legacy_migrated(&self) -> StoreResult<()> {
        self.save(keys::LEGACY_MIGRATED, &true).await
    }
}
