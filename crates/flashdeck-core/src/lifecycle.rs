//! Card lifecycle operations
//!
//! Composite actions over the three card collections. Each one keeps a card
//! id in at most one collection at every observation point, given that the
//! store's own single-record operations succeed.
//!
//! # Ordering
//!
//! There is no cross-collection transaction in the store contract, so every
//! move writes the destination first and removes the other copies after
//! (see [`CardStore::relocate`]). If a step fails the card is left in two
//! collections rather than lost; re-running the same operation converges.
//!
//! ```text
//!            move_card / practice_unknown / reset_all
//!   known  <---------------->  active  <---------------->  unknown
//!                                 |
//!       delete_card (any state) -> removed
//! ```

use tracing::{debug, info};

use crate::card::{CardId, Collection, DeckSnapshot, Flashcard};
use crate::language::LanguageFilter;
use crate::storage::{CardStore, StoreError, StoreResult};

/// Result of [`practice_unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeOutcome {
    /// These cards went back into active.
    Moved(Vec<Flashcard>),
    /// No unknown card matched the filter. Reported, not an error.
    NothingToDo,
}

impl PracticeOutcome {
    pub fn moved(&self) -> usize {
        match self {
            PracticeOutcome::Moved(cards) => cards.len(),
            PracticeOutcome::NothingToDo => 0,
        }
    }
}

/// Read all three collections.
pub async fn snapshot<S: CardStore>(store: &S) -> StoreResult<DeckSnapshot> {
    Ok(DeckSnapshot {
        active: store.get_all(Collection::Active).await?,
        known: store.get_all(Collection::Known).await?,
        unknown: store.get_all(Collection::Unknown).await?,
    })
}

/// First collection holding `id`, looked up in [`Collection::ALL`] order.
pub async fn locate<S: CardStore>(store: &S, id: CardId) -> StoreResult<Option<Collection>> {
    for collection in Collection::ALL {
        if store.contains(collection, id).await? {
            return Ok(Some(collection));
        }
    }
    Ok(None)
}

/// Accept a new card into practice.
///
/// The card lands in active with no status. An id already present in any
/// collection is a `DuplicateKey` naming the collection that holds it.
pub async fn add_card<S: CardStore>(store: &S, card: Flashcard) -> StoreResult<Flashcard> {
    if let Some(collection) = locate(store, card.id).await? {
        return Err(StoreError::DuplicateKey {
            collection,
            id: card.id,
        });
    }

    let card = card.for_collection(Collection::Active);
    store.add(Collection::Active, card.clone()).await?;
    info!(id = card.id, "card added to practice");
    Ok(card)
}

/// Move a card into `destination` and return it as stored.
///
/// Idempotent: repeating the call leaves exactly one copy in `destination`.
/// A card found nowhere (a stale copy of a deleted card) is inserted. A
/// direct known/unknown swap is rejected with `InvalidTransition`.
pub async fn move_card<S: CardStore>(
    store: &S,
    card: &Flashcard,
    destination: Collection,
) -> StoreResult<Flashcard> {
    if let Some(from) = locate(store, card.id).await? {
        if !from.can_transition_to(destination) {
            return Err(StoreError::InvalidTransition {
                id: card.id,
                from,
                to: destination,
            });
        }
    }

    let stored = store.relocate(card, destination).await?;
    info!(id = card.id, to = %destination, "card moved");
    Ok(stored)
}

/// Remove a card from whichever collection holds it.
///
/// Returns `true` if any collection held it. Deleting twice is a no-op.
pub async fn delete_card<S: CardStore>(store: &S, id: CardId) -> StoreResult<bool> {
    let mut removed = false;
    for collection in Collection::ALL {
        removed |= store.delete(collection, id).await?;
    }

    if removed {
        info!(id, "card deleted");
    } else {
        debug!(id, "delete of absent card");
    }
    Ok(removed)
}

/// Move every known and unknown card back into active with no status.
///
/// Cards already in active are left as they are; afterwards active holds the
/// union of the three collections and known/unknown are empty.
pub async fn reset_all<S: CardStore>(store: &S) -> StoreResult<DeckSnapshot> {
    let mut moved = 0usize;
    for source in [Collection::Known, Collection::Unknown] {
        for card in store.get_all(source).await? {
            store.relocate(&card, Collection::Active).await?;
            moved += 1;
        }
    }

    info!(moved, "all cards reset for practice");
    snapshot(store).await
}

/// Move unknown cards that pass `filter` back into active.
///
/// Unknown cards the filter excludes stay where they are.
pub async fn practice_unknown<S: CardStore>(
    store: &S,
    filter: &LanguageFilter,
) -> StoreResult<PracticeOutcome> {
    let selected = filter.apply(&store.get_all(Collection::Unknown).await?);
    if selected.is_empty() {
        debug!(%filter, "no unknown cards to practice");
        return Ok(PracticeOutcome::NothingToDo);
    }

    let mut moved = Vec::with_capacity(selected.len());
    for card in &selected {
        moved.push(store.relocate(card, Collection::Active).await?);
    }

    info!(count = moved.len(), %filter, "unknown cards added to practice");
    Ok(PracticeOutcome::Moved(moved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardStatus, FlashcardBuilder};
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn hola() -> Flashcard {
        FlashcardBuilder::new()
            .id(1)
            .source_text("hola")
            .translated_text("hello")
            .source_lang("Spanish")
            .target_lang("English")
            .build()
    }

    #[tokio::test]
    async fn test_move_to_known_scenario() {
        let store = MemoryStore::new();
        store.add(Collection::Active, hola()).await.unwrap();

        move_card(&store, &hola(), Collection::Known).await.unwrap();

        let deck = snapshot(&store).await.unwrap();
        assert!(deck.active.is_empty());
        assert_eq!(
            deck.known,
            vec![FlashcardBuilder::new()
                .id(1)
                .source_text("hola")
                .translated_text("hello")
                .source_lang("Spanish")
                .target_lang("English")
                .status(Some(CardStatus::Known))
                .build()]
        );
        assert!(deck.unknown.is_empty());
    }

    #[tokio::test]
    async fn test_move_is_idempotent() {
        let store = MemoryStore::new();
        store.add(Collection::Active, hola()).await.unwrap();

        move_card(&store, &hola(), Collection::Known).await.unwrap();
        move_card(&store, &hola(), Collection::Known).await.unwrap();

        let deck = snapshot(&store).await.unwrap();
        assert_eq!(deck.known.len(), 1);
        assert!(deck.active.is_empty());
        assert!(deck.unknown.is_empty());
    }

    #[tokio::test]
    async fn test_known_to_unknown_rejected() {
        let store = MemoryStore::new();
        store.add(Collection::Active, hola()).await.unwrap();
        move_card(&store, &hola(), Collection::Known).await.unwrap();

        let result = move_card(&store, &hola(), Collection::Unknown).await;
        assert!(matches!(
            result,
            Err(StoreError::InvalidTransition {
                id: 1,
                from: Collection::Known,
                to: Collection::Unknown
            })
        ));
        assert_eq!(locate(&store, 1).await.unwrap(), Some(Collection::Known));
    }

    #[tokio::test]
    async fn test_add_card_rejects_id_held_elsewhere() {
        let store = MemoryStore::new();
        store.add(Collection::Unknown, hola()).await.unwrap();

        let result = add_card(&store, hola()).await;
        assert!(matches!(
            result,
            Err(StoreError::DuplicateKey {
                collection: Collection::Unknown,
                id: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_add_card_clears_status() {
        let store = MemoryStore::new();
        let mut card = hola();
        card.status = Some(CardStatus::Known);

        let stored = add_card(&store, card).await.unwrap();
        assert_eq!(stored.status, None);
        assert_eq!(store.get(Collection::Active, 1).await.unwrap(), Some(hola()));
    }

    #[tokio::test]
    async fn test_delete_card_from_any_collection() {
        let store = MemoryStore::new();
        store.add(Collection::Unknown, hola()).await.unwrap();

        assert!(delete_card(&store, 1).await.unwrap());
        assert!(!delete_card(&store, 1).await.unwrap());
        assert!(snapshot(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_practice_unknown_nothing_to_do() {
        let store = MemoryStore::new();
        let outcome = practice_unknown(&store, &LanguageFilter::All).await.unwrap();
        assert_eq!(outcome, PracticeOutcome::NothingToDo);
        assert_eq!(outcome.moved(), 0);
    }
}
