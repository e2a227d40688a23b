//! IndexedDB storage backend implementing the CardStore trait.
//!
//! Records are plain JS objects in the same camelCase shape the web
//! front-end writes, so an existing `language-learning-db` opens unchanged.

use flashdeck_core::card::{CardId, CardStatus, Collection, Flashcard};
use flashdeck_core::storage::{CardStore, StoreError, StoreResult};
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

use crate::error::IndexedDbError;
use crate::idb::{self, DEFAULT_DB_NAME, SETTINGS_STORE};

/// IndexedDB-backed card store for browser WASM.
///
/// One object store per card collection (keyPath `id`) and a `settings`
/// store (keyPath `key`). Single-record operations each run in their own
/// transaction; [`CardStore::relocate`] runs in one transaction spanning the
/// three card stores.
pub struct IndexedDbStore {
    db: IdbDatabase,
}

impl IndexedDbStore {
    /// Open or create an IndexedDB store with the given database name.
    pub async fn open(db_name: &str) -> crate::Result<Self> {
        let db = idb::open_database(db_name).await?;
        debug!(db_name, "opened IndexedDB card store");
        Ok(Self { db })
    }

    /// Open with the default database name `language-learning-db`.
    pub async fn open_default() -> crate::Result<Self> {
        Self::open(DEFAULT_DB_NAME).await
    }

    /// Close the database connection.
    pub fn close(&self) {
        self.db.close();
    }

    /// Delete the database (for testing/cleanup).
    pub async fn delete_database(db_name: &str) -> crate::Result<()> {
        idb::delete_database(db_name).await
    }

    /// Issue one request in its own transaction and wait for both.
    async fn run<F>(
        &self,
        store_name: &str,
        mode: IdbTransactionMode,
        op: F,
    ) -> crate::Result<JsValue>
    where
        F: FnOnce(&IdbObjectStore) -> Result<IdbRequest, JsValue>,
    {
        let (tx, store) = idb::begin_transaction(&self.db, store_name, mode)?;
        let req = op(&store).map_err(|e| IndexedDbError::Request(format!("{:?}", e)))?;
        let result = idb::await_request(&req).await?;
        idb::await_transaction(&tx).await?;
        Ok(result)
    }
}

impl CardStore for IndexedDbStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>> {
        let result = self
            .run(collection.name(), IdbTransactionMode::Readonly, |s| {
                s.get_all()
            })
            .await?;

        let array = js_sys::Array::from(&result);
        let mut cards = Vec::with_capacity(array.length() as usize);
        for i in 0..array.length() {
            cards.push(js_to_card(&array.get(i))?);
        }
        Ok(cards)
    }

    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>> {
        let result = self
            .run(collection.name(), IdbTransactionMode::Readonly, |s| {
                s.get(&card_key(id))
            })
            .await?;

        if result.is_undefined() || result.is_null() {
            return Ok(None);
        }
        Ok(Some(js_to_card(&result)?))
    }

    async fn contains(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        let result = self
            .run(collection.name(), IdbTransactionMode::Readonly, |s| {
                s.count_with_key(&card_key(id))
            })
            .await?;
        Ok(result.as_f64().unwrap_or(0.0) > 0.0)
    }

    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        let js_val = card_to_js(&card)?;
        match self
            .run(collection.name(), IdbTransactionMode::Readwrite, |s| {
                s.add(&js_val)
            })
            .await
        {
            Ok(_) => {
                debug!(id = card.id, %collection, "card inserted");
                Ok(())
            }
            Err(IndexedDbError::Constraint(_)) => Err(StoreError::DuplicateKey {
                collection,
                id: card.id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        let js_val = card_to_js(&card)?;
        self.run(collection.name(), IdbTransactionMode::Readwrite, |s| {
            s.put(&js_val)
        })
        .await?;
        debug!(id = card.id, %collection, "card stored");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        // Count and delete share one transaction; requests run in order.
        let (tx, store) =
            idb::begin_transaction(&self.db, collection.name(), IdbTransactionMode::Readwrite)?;
        let key = card_key(id);
        let count_req = store
            .count_with_key(&key)
            .map_err(|e| StoreError::Backend(format!("IDB count: {:?}", e)))?;
        let delete_req = store
            .delete(&key)
            .map_err(|e| StoreError::Backend(format!("IDB delete: {:?}", e)))?;

        let existed = idb::await_request(&count_req).await?.as_f64().unwrap_or(0.0) > 0.0;
        idb::await_request(&delete_req).await?;
        idb::await_transaction(&tx).await?;

        debug!(id, %collection, removed = existed, "card delete");
        Ok(existed)
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.run(collection.name(), IdbTransactionMode::Readwrite, |s| {
            s.clear()
        })
        .await?;
        debug!(%collection, "collection cleared");
        Ok(())
    }

    async fn count(&self, collection: Collection) -> StoreResult<usize> {
        let result = self
            .run(collection.name(), IdbTransactionMode::Readonly, |s| s.count())
            .await?;
        Ok(result.as_f64().unwrap_or(0.0) as usize)
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<Value>> {
        let record = self
            .run(SETTINGS_STORE, IdbTransactionMode::Readonly, |s| {
                s.get(&JsValue::from_str(key))
            })
            .await?;

        if record.is_undefined() || record.is_null() {
            return Ok(None);
        }
        let value = js_sys::Reflect::get(&record, &"value".into())
            .map_err(|_| StoreError::Serialization(format!("setting {} has no value", key)))?;
        Ok(Some(js_to_value(&value)?))
    }

    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        let record = js_sys::Object::new();
        set_prop(&record, "key", &JsValue::from_str(key))?;
        set_prop(&record, "value", &value_to_js(&value)?)?;

        self.run(SETTINGS_STORE, IdbTransactionMode::Readwrite, |s| {
            s.put(&record)
        })
        .await?;
        debug!(key, "setting saved");
        Ok(())
    }

    /// One readwrite transaction over the three card stores: the insert and
    /// the removals commit or abort together.
    async fn relocate(&self, card: &Flashcard, destination: Collection) -> StoreResult<Flashcard> {
        let stored = card.for_collection(destination);
        let js_val = card_to_js(&stored)?;
        let names = Collection::ALL.map(Collection::name);
        let tx = idb::begin_multi_transaction(&self.db, &names, IdbTransactionMode::Readwrite)?;

        for collection in Collection::ALL {
            let store = tx
                .object_store(collection.name())
                .map_err(|e| StoreError::Backend(format!("IDB store: {:?}", e)))?;
            let request = if collection == destination {
                store.put(&js_val)
            } else {
                store.delete(&card_key(card.id))
            };
            request.map_err(|e| StoreError::Backend(format!("IDB relocate: {:?}", e)))?;
        }

        idb::await_transaction(&tx).await?;
        debug!(id = card.id, %destination, "card relocated");
        Ok(stored)
    }
}

// ============================================================================
// JS <-> Flashcard conversion
// ============================================================================

fn card_key(id: CardId) -> JsValue {
    JsValue::from_f64(id as f64)
}

/// Convert a card to the JS object shape stored by the web front-end.
fn card_to_js(card: &Flashcard) -> StoreResult<JsValue> {
    let obj = js_sys::Object::new();

    set_prop(&obj, "id", &card_key(card.id))?;
    set_prop(&obj, "sourceText", &JsValue::from_str(&card.source_text))?;
    set_prop(&obj, "translatedText", &JsValue::from_str(&card.translated_text))?;
    set_prop(&obj, "sourceLang", &JsValue::from_str(&card.source_lang))?;
    set_prop(&obj, "targetLang", &JsValue::from_str(&card.target_lang))?;
    let status = match card.status {
        Some(status) => JsValue::from_str(status.as_str()),
        None => JsValue::NULL,
    };
    set_prop(&obj, "status", &status)?;

    Ok(obj.into())
}

/// Convert a stored JS object back to a card. A missing or null `status`
/// reads as `None`.
fn js_to_card(val: &JsValue) -> StoreResult<Flashcard> {
    let status = js_sys::Reflect::get(val, &"status".into())
        .map_err(|_| StoreError::Serialization("missing property: status".into()))?;
    let status = if status.is_null() || status.is_undefined() {
        None
    } else {
        match status.as_string().as_deref() {
            Some("known") => Some(CardStatus::Known),
            Some("unknown") => Some(CardStatus::Unknown),
            other => {
                return Err(StoreError::Serialization(format!(
                    "invalid card status {:?}",
                    other
                )))
            }
        }
    };

    Ok(Flashcard {
        id: get_number_prop(val, "id")? as CardId,
        source_text: get_string_prop(val, "sourceText")?,
        translated_text: get_string_prop(val, "translatedText")?,
        source_lang: get_string_prop(val, "sourceLang")?,
        target_lang: get_string_prop(val, "targetLang")?,
        status,
    })
}

/// Setting values cross into JS through their JSON text.
fn value_to_js(value: &Value) -> StoreResult<JsValue> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(|e| IndexedDbError::JsValue(format!("{:?}", e)).into())
}

fn js_to_value(val: &JsValue) -> StoreResult<Value> {
    if val.is_undefined() {
        return Ok(Value::Null);
    }
    let json: String = js_sys::JSON::stringify(val)
        .map_err(|e| StoreError::from(IndexedDbError::JsValue(format!("{:?}", e))))?
        .into();
    Ok(serde_json::from_str(&json)?)
}

/// Set a property on a JS object.
fn set_prop(obj: &js_sys::Object, key: &str, val: &JsValue) -> StoreResult<()> {
    js_sys::Reflect::set(obj, &key.into(), val)
        .map_err(|_| StoreError::Backend(format!("failed to set property: {}", key)))?;
    Ok(())
}

/// Get a string property from a JS object.
fn get_string_prop(val: &JsValue, key: &str) -> StoreResult<String> {
    let prop = js_sys::Reflect::get(val, &key.into())
        .map_err(|_| StoreError::Serialization(format!("missing property: {}", key)))?;
    prop.as_string()
        .ok_or_else(|| StoreError::Serialization(format!("{} is not a string", key)))
}

/// Get a number property from a JS object.
fn get_number_prop(val: &JsValue, key: &str) -> StoreResult<f64> {
    let prop = js_sys::Reflect::get(val, &key.into())
        .map_err(|_| StoreError::Serialization(format!("missing property: {}", key)))?;
    prop.as_f64()
        .ok_or_else(|| StoreError::Serialization(format!("{} is not a number", key)))
}
