//! Storage trait definitions

use serde_json::Value;

use crate::card::{CardId, Collection, Flashcard};
use crate::storage::error::StoreResult;

/// Durable CRUD over the three card collections and the settings table.
///
/// Every method is async because the browser backend (IndexedDB) is. Native
/// backends complete immediately. Receivers are `&self`; backends use interior
/// mutability so one store can be shared by reference across components.
///
/// Each call is atomic for a single record. Nothing here spans collections
/// except [`CardStore::relocate`].
#[allow(async_fn_in_trait)]
pub trait CardStore {
    /// Every card in `collection`, in no particular order.
    ///
    /// An empty collection yields an empty vec, never an error.
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>>;

    /// Retrieve a card by id.
    ///
    /// Returns `None` if not found.
    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>>;

    /// Check if a card exists in a collection.
    async fn contains(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }

    /// Insert a card.
    ///
    /// If the id already exists in the collection, returns `StoreError::DuplicateKey`.
    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()>;

    /// Insert or replace a card.
    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()>;

    /// Delete a card by id.
    ///
    /// Returns `true` if a card was removed, `false` if it wasn't there.
    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool>;

    /// Remove every card from a collection.
    async fn clear(&self, collection: Collection) -> StoreResult<()>;

    /// Number of cards in a collection.
    async fn count(&self, collection: Collection) -> StoreResult<usize> {
        Ok(self.get_all(collection).await?.len())
    }

    /// Raw setting value. No default initialization happens here, see
    /// [`crate::settings::Settings`] for the read-through contract.
    async fn setting(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Insert or replace a setting value.
    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Move a card into `destination`, carrying that collection's status.
    ///
    /// The destination write happens before the removals: a failure part way
    /// leaves the card in two collections, never in none. Backends with real
    /// multi-collection transactions override this to make it all-or-nothing.
    async fn relocate(&self, card: &Flashcard, destination: Collection) -> StoreResult<Flashcard> {
        let stored = card.for_collection(destination);
        self.put(destination, stored.clone()).await?;

        for other in Collection::ALL {
            if other != destination {
                self.delete(other, card.id).await?;
            }
        }

        Ok(stored)
    }
}
