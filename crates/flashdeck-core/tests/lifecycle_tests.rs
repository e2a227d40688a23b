//! Cross-collection properties of the lifecycle operations

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use flashdeck_core::{
    add_card, delete_card, migrate_legacy_data, move_card, practice_unknown, reset_all, snapshot,
    CardId, CardStatus, CardStore, Collection, Flashcard, FlashcardBuilder, LanguageFilter,
    LegacyMigrator, MemoryLegacyStorage, MemoryStore, MigrationOutcome, PracticeOutcome, Settings,
    StoreError, StoreResult,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Helper to create a test card
fn create_test_card(id: CardId, source_lang: &str, target_lang: &str) -> Flashcard {
    FlashcardBuilder::new()
        .id(id)
        .source_text(format!("text-{}", id))
        .translated_text(format!("translation-{}", id))
        .source_lang(source_lang)
        .target_lang(target_lang)
        .build()
}

fn ids(cards: &[Flashcard]) -> BTreeSet<CardId> {
    cards.iter().map(|c| c.id).collect()
}

async fn assert_single_home<S: CardStore>(store: &S) {
    let deck = snapshot(store).await.unwrap();
    let mut seen = BTreeSet::new();
    for card in deck.all() {
        assert!(seen.insert(card.id), "card {} held twice", card.id);
    }
    for collection in Collection::ALL {
        for card in deck.cards(collection) {
            assert_eq!(card.status, collection.status());
        }
    }
}

/// Memory store that yields before every operation and can fail deletes.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl CardStore for FlakyStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>> {
        tokio::task::yield_now().await;
        self.inner.get_all(collection).await
    }

    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>> {
        tokio::task::yield_now().await;
        self.inner.get(collection, id).await
    }

    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.inner.add(collection, card).await
    }

    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.inner.put(collection, card).await
    }

    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        tokio::task::yield_now().await;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("delete refused".to_string()));
        }
        self.inner.delete(collection, id).await
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.inner.clear(collection).await
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<Value>> {
        tokio::task::yield_now().await;
        self.inner.setting(key).await
    }

    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.inner.save_setting(key, value).await
    }
}

/// Memory store where another writer lands `racing_id` just before our insert.
struct RacingStore {
    inner: MemoryStore,
    racing_id: CardId,
}

impl CardStore for RacingStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>> {
        self.inner.get_all(collection).await
    }

    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>> {
        self.inner.get(collection, id).await
    }

    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        if card.id == self.racing_id {
            self.inner.put(collection, card.clone()).await?;
        }
        self.inner.add(collection, card).await
    }

    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        self.inner.put(collection, card).await
    }

    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        self.inner.delete(collection, id).await
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.inner.clear(collection).await
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<Value>> {
        self.inner.setting(key).await
    }

    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        self.inner.save_setting(key, value).await
    }
}

async fn random_moves_keep_single_home<S: CardStore>(store: &S, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let cards: Vec<Flashcard> = (1..=8)
        .map(|id| create_test_card(id, "Spanish", "English"))
        .collect();
    for card in &cards {
        add_card(store, card.clone()).await.unwrap();
    }

    for _ in 0..200 {
        let card = &cards[rng.random_range(0..cards.len())];
        match rng.random_range(0..5) {
            0 => {
                delete_card(store, card.id).await.unwrap();
            }
            n => {
                let destination = Collection::ALL[n % 3];
                match move_card(store, card, destination).await {
                    Ok(stored) => assert_eq!(stored.status, destination.status()),
                    Err(StoreError::InvalidTransition { from, to, .. }) => {
                        assert!(!from.can_transition_to(to));
                    }
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
        }
        assert_single_home(store).await;
    }
}

#[tokio::test]
async fn test_random_moves_keep_single_home() {
    random_moves_keep_single_home(&MemoryStore::new(), 0x5eed).await;
}

#[tokio::test]
async fn test_random_moves_keep_single_home_with_yielding_store() {
    random_moves_keep_single_home(&FlakyStore::default(), 0xcafe).await;
}

#[tokio::test]
async fn test_reset_all_yields_union_in_active() {
    let store = MemoryStore::new();
    for id in 1..=6 {
        add_card(&store, create_test_card(id, "Spanish", "English"))
            .await
            .unwrap();
    }
    let card = |id| create_test_card(id, "Spanish", "English");
    move_card(&store, &card(2), Collection::Known).await.unwrap();
    move_card(&store, &card(3), Collection::Known).await.unwrap();
    move_card(&store, &card(5), Collection::Unknown).await.unwrap();

    let before = snapshot(&store).await.unwrap();
    let union: BTreeSet<CardId> = before.all().map(|c| c.id).collect();

    let after = reset_all(&store).await.unwrap();

    assert!(after.known.is_empty());
    assert!(after.unknown.is_empty());
    assert_eq!(ids(&after.active), union);
    assert!(after.active.iter().all(|c| c.status.is_none()));
    assert_eq!(after.active.len(), 6);
}

#[tokio::test]
async fn test_reset_all_on_empty_store() {
    let store = MemoryStore::new();
    let after = reset_all(&store).await.unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn test_practice_unknown_filters_by_language() {
    let store = MemoryStore::new();
    let spanish = create_test_card(1, "Spanish", "English");
    let french = create_test_card(2, "French", "English");
    let reverse = create_test_card(3, "English", "spanish");
    for card in [&spanish, &french, &reverse] {
        add_card(&store, card.clone()).await.unwrap();
        move_card(&store, card, Collection::Unknown).await.unwrap();
    }

    let outcome = practice_unknown(&store, &LanguageFilter::parse("SPANISH"))
        .await
        .unwrap();

    let PracticeOutcome::Moved(moved) = outcome else {
        panic!("expected cards to move");
    };
    assert_eq!(ids(&moved), BTreeSet::from([1, 3]));
    assert!(moved.iter().all(|c| c.status.is_none()));

    let deck = snapshot(&store).await.unwrap();
    assert_eq!(ids(&deck.active), BTreeSet::from([1, 3]));
    assert_eq!(ids(&deck.unknown), BTreeSet::from([2]));

    let again = practice_unknown(&store, &LanguageFilter::parse("Spanish"))
        .await
        .unwrap();
    assert_eq!(again, PracticeOutcome::NothingToDo);
}

#[tokio::test]
async fn test_failed_removal_keeps_card_and_retry_converges() {
    let store = FlakyStore::default();
    let card = create_test_card(1, "Spanish", "English");
    add_card(&store, card.clone()).await.unwrap();

    store.fail_deletes(true);
    let result = move_card(&store, &card, Collection::Known).await;
    assert!(matches!(result, Err(StoreError::Backend(_))));

    // Destination was written first: the card is duplicated, not lost.
    let deck = snapshot(&store).await.unwrap();
    assert_eq!(deck.locate(1), Some(Collection::Active));
    assert_eq!(ids(&deck.known), BTreeSet::from([1]));

    store.fail_deletes(false);
    move_card(&store, &card, Collection::Known).await.unwrap();

    let deck = snapshot(&store).await.unwrap();
    assert!(deck.active.is_empty());
    assert_eq!(ids(&deck.known), BTreeSet::from([1]));
    assert_single_home(&store).await;
}

#[tokio::test]
async fn test_read_through_setting_sticks() {
    let store = MemoryStore::new();
    let settings = Settings::new(&store);

    let first: String = settings
        .get_or_init("selectedLanguage", "all".to_string())
        .await
        .unwrap();
    let second: String = settings
        .get_or_init("selectedLanguage", "Spanish".to_string())
        .await
        .unwrap();

    assert_eq!(first, "all");
    assert_eq!(second, "all");
}

fn legacy_fixture() -> MemoryLegacyStorage {
    let mut known = create_test_card(2, "French", "English");
    known.status = Some(CardStatus::Known);

    let mut legacy = MemoryLegacyStorage::new()
        .with_cards("flashcards", &[create_test_card(1, "Spanish", "English")])
        .unwrap()
        .with_cards("knownCards", &[known])
        .unwrap()
        .with_cards("unknownCards", &[create_test_card(3, "German", "English")])
        .unwrap();
    legacy.set_item("selectedLanguage", "French");
    legacy
}

#[tokio::test]
async fn test_migration_runs_once() {
    let store = MemoryStore::new();
    let legacy = legacy_fixture();
    let migrator = LegacyMigrator::new();

    let first = migrator.migrate(&store, &legacy).await.unwrap();
    let MigrationOutcome::Migrated(report) = first else {
        panic!("first run should import");
    };
    assert_eq!(report.imported, 3);
    assert_eq!(report.skipped, 0);

    let second = migrator.migrate(&store, &legacy).await.unwrap();
    assert_eq!(second, MigrationOutcome::AlreadyMigrated);

    // A fresh migrator (new process) sees the persisted gate.
    let third = LegacyMigrator::new().migrate(&store, &legacy).await.unwrap();
    assert_eq!(third, MigrationOutcome::AlreadyMigrated);

    let deck = snapshot(&store).await.unwrap();
    assert_eq!(ids(&deck.active), BTreeSet::from([1]));
    assert_eq!(ids(&deck.known), BTreeSet::from([2]));
    assert_eq!(ids(&deck.unknown), BTreeSet::from([3]));
    assert_eq!(deck.unknown[0].status, Some(CardStatus::Unknown));
    assert_single_home(&store).await;

    let settings = Settings::new(&store);
    assert!(settings.legacy_migrated().await.unwrap());
    assert_eq!(
        settings.selected_language().await.unwrap(),
        LanguageFilter::parse("French")
    );
}

#[tokio::test]
async fn test_concurrent_migration_imports_once() {
    let store = FlakyStore::default();
    let legacy = legacy_fixture();
    let migrator = LegacyMigrator::new();

    let (a, b) = futures::join!(
        migrator.migrate(&store, &legacy),
        migrator.migrate(&store, &legacy)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let migrated = outcomes
        .iter()
        .filter(|o| matches!(o, MigrationOutcome::Migrated(_)))
        .count();
    assert_eq!(migrated, 1);
    assert!(outcomes.contains(&MigrationOutcome::AlreadyMigrated));
    assert_eq!(snapshot(&store).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_concurrent_free_function_migration_imports_once() {
    let store = FlakyStore::default();
    let legacy = legacy_fixture();

    let (a, b) = futures::join!(
        migrate_legacy_data(&store, &legacy),
        migrate_legacy_data(&store, &legacy)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let migrated = outcomes
        .iter()
        .filter(|o| matches!(o, MigrationOutcome::Migrated(_)))
        .count();
    assert_eq!(migrated, 1);
    assert!(outcomes.contains(&MigrationOutcome::AlreadyMigrated));
    assert_eq!(snapshot(&store).await.unwrap().len(), 3);
    assert_single_home(&store).await;
}

#[tokio::test]
async fn test_migration_counts_colliding_insert_as_skipped() {
    // Another process inserts card 2 between the lookup and the insert.
    let store = RacingStore {
        inner: MemoryStore::new(),
        racing_id: 2,
    };

    let outcome = migrate_legacy_data(&store, &legacy_fixture()).await.unwrap();

    let MigrationOutcome::Migrated(report) = outcome else {
        panic!("expected import");
    };
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);
    assert_single_home(&store.inner).await;
}

#[tokio::test]
async fn test_interrupted_migration_resumes_without_duplicates() {
    let store = MemoryStore::new();
    // A previous run stored card 1 but never wrote the gate.
    store
        .add(Collection::Active, create_test_card(1, "Spanish", "English"))
        .await
        .unwrap();

    let outcome = LegacyMigrator::new()
        .migrate(&store, &legacy_fixture())
        .await
        .unwrap();

    let MigrationOutcome::Migrated(report) = outcome else {
        panic!("expected import");
    };
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);
    assert_single_home(&store).await;
}

#[tokio::test]
async fn test_malformed_legacy_data_leaves_gate_unset() {
    let store = MemoryStore::new();
    let mut legacy = MemoryLegacyStorage::new();
    legacy.set_item("flashcards", "not json");

    let result = LegacyMigrator::new().migrate(&store, &legacy).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
    assert!(!Settings::new(&store).legacy_migrated().await.unwrap());
}
