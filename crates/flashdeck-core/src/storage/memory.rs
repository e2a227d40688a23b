//! In-memory storage backend
//!
//! A simple HashMap-based implementation for testing and development.
//! Not suitable for production use due to lack of persistence.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use serde_json::Value;

use crate::card::{CardId, Collection, Flashcard};
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::traits::CardStore;

/// In-memory card store.
///
/// Cards are kept in ordered maps so `get_all` is deterministic. Useful for:
/// - Unit testing
/// - Development/prototyping
/// - Short-lived processes that don't need persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    cards: RwLock<HashMap<Collection, BTreeMap<CardId, Flashcard>>>,
    settings: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial cards, each placed in the
    /// collection matching its status.
    pub fn with_cards(cards: Vec<Flashcard>) -> Self {
        let store = Self::new();
        {
            let mut collections = store.cards.write();
            for card in cards {
                collections
                    .entry(Collection::from(card.status))
                    .or_default()
                    .entry(card.id)
                    .or_insert(card);
            }
        }
        store
    }
}

impl CardStore for MemoryStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>> {
        Ok(self
            .cards
            .read()
            .get(&collection)
            .map(|cards| cards.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>> {
        Ok(self
            .cards
            .read()
            .get(&collection)
            .and_then(|cards| cards.get(&id).cloned()))
    }

    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        let mut collections = self.cards.write();
        let cards = collections.entry(collection).or_default();
        if cards.contains_key(&card.id) {
            return Err(StoreError::DuplicateKey {
                collection,
                id: card.id,
            });
        }
        cards.insert(card.id, card);
        Ok(())
    }

    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        self.cards
            .write()
            .entry(collection)
            .or_default()
            .insert(card.id, card);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        Ok(self
            .cards
            .write()
            .get_mut(&collection)
            .is_some_and(|cards| cards.remove(&id).is_some()))
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.cards.write().remove(&collection);
        Ok(())
    }

    async fn count(&self, collection: Collection) -> StoreResult<usize> {
        Ok(self.cards.read().get(&collection).map_or(0, BTreeMap::len))
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.settings.read().get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        self.settings.write().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardStatus, FlashcardBuilder};

    fn test_card(id: CardId) -> Flashcard {
        FlashcardBuilder::new()
            .id(id)
            .source_text("hola")
            .translated_text("hello")
            .source_lang("Spanish")
            .target_lang("English")
            .build()
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = MemoryStore::new();
        store.add(Collection::Active, test_card(1)).await.unwrap();

        let retrieved = store.get(Collection::Active, 1).await.unwrap();
        assert_eq!(retrieved, Some(test_card(1)));
        assert!(store.get(Collection::Known, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_duplicate() {
        let store = MemoryStore::new();
        store.add(Collection::Active, test_card(1)).await.unwrap();

        let result = store.add(Collection::Active, test_card(1)).await;
        assert!(matches!(
            result,
            Err(StoreError::DuplicateKey {
                collection: Collection::Active,
                id: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_uniqueness_is_per_collection() {
        let store = MemoryStore::new();
        store.add(Collection::Active, test_card(1)).await.unwrap();
        store.add(Collection::Known, test_card(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let store = MemoryStore::new();
        assert!(!store.delete(Collection::Unknown, 42).await.unwrap());

        store.add(Collection::Unknown, test_card(42)).await.unwrap();
        assert!(store.delete(Collection::Unknown, 42).await.unwrap());
        assert!(!store.delete(Collection::Unknown, 42).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_empty_and_clear() {
        let store = MemoryStore::new();
        assert!(store.get_all(Collection::Known).await.unwrap().is_empty());

        store.add(Collection::Known, test_card(1)).await.unwrap();
        store.add(Collection::Known, test_card(2)).await.unwrap();
        assert_eq!(store.count(Collection::Known).await.unwrap(), 2);

        store.clear(Collection::Known).await.unwrap();
        assert!(store.get_all(Collection::Known).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemoryStore::new();
        store.add(Collection::Active, test_card(1)).await.unwrap();

        let mut updated = test_card(1);
        updated.translated_text = "hi".to_string();
        store.put(Collection::Active, updated).await.unwrap();

        let cards = store.get_all(Collection::Active).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].translated_text, "hi");
    }

    #[tokio::test]
    async fn test_with_cards_places_by_status() {
        let known = FlashcardBuilder::new()
            .id(2)
            .status(Some(CardStatus::Known))
            .build();
        let store = MemoryStore::with_cards(vec![test_card(1), known]);

        assert_eq!(store.count(Collection::Active).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Known).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Unknown).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_settings_upsert() {
        let store = MemoryStore::new();
        assert!(store.setting("theme").await.unwrap().is_none());

        store.save_setting("theme", Value::from("dark")).await.unwrap();
        store.save_setting("theme", Value::from("light")).await.unwrap();

        assert_eq!(store.setting("theme").await.unwrap(), Some(Value::from("light")));
    }
}
