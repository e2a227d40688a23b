//! One-time import from the legacy flat storage
//!
//! Older versions of the web front-end kept everything in `localStorage`:
//! JSON arrays of cards under `flashcards`, `knownCards` and `unknownCards`,
//! and the practice language filter as a bare string under
//! `selectedLanguage`. [`LegacyMigrator`] copies that data into a
//! [`CardStore`] once, gated by the `localStorage_migrated` setting.

use std::collections::HashMap;

use futures::lock::Mutex;
use tracing::{info, warn};

use crate::card::{Collection, Flashcard};
use crate::lifecycle::locate;
use crate::settings::{self, Settings};
use crate::storage::{CardStore, StoreError, StoreResult};

/// Keys of the legacy flat storage.
pub mod keys {
    pub const FLASHCARDS: &str = "flashcards";
    pub const KNOWN_CARDS: &str = "knownCards";
    pub const UNKNOWN_CARDS: &str = "unknownCards";
    pub const SELECTED_LANGUAGE: &str = "selectedLanguage";
}

const DEFAULT_SELECTED_LANGUAGE: &str = "all";

/// A flat string key-value source, shaped like browser `localStorage`.
pub trait LegacyStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
}

/// HashMap-backed legacy storage for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryLegacyStorage {
    items: HashMap<String, String>,
}

impl MemoryLegacyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    /// Store `cards` as a JSON array under `key`.
    pub fn with_cards(mut self, key: &str, cards: &[Flashcard]) -> StoreResult<Self> {
        self.set_item(key, serde_json::to_string(cards)?);
        Ok(self)
    }
}

impl LegacyStorage for MemoryLegacyStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }
}

/// Everything the legacy storage holds, parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacySnapshot {
    pub active: Vec<Flashcard>,
    pub known: Vec<Flashcard>,
    pub unknown: Vec<Flashcard>,
    pub selected_language: String,
}

impl LegacySnapshot {
    /// Parse the legacy keys. Missing or empty arrays read as empty, a
    /// missing or empty language as `"all"`. Malformed JSON is a
    /// `Serialization` error.
    pub fn read<L: LegacyStorage + ?Sized>(legacy: &L) -> StoreResult<Self> {
        Ok(Self {
            active: read_cards(legacy, keys::FLASHCARDS)?,
            known: read_cards(legacy, keys::KNOWN_CARDS)?,
            unknown: read_cards(legacy, keys::UNKNOWN_CARDS)?,
            selected_language: legacy
                .get_item(keys::SELECTED_LANGUAGE)?
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SELECTED_LANGUAGE.to_string()),
        })
    }

    pub fn cards(&self, collection: Collection) -> &[Flashcard] {
        match collection {
            Collection::Active => &self.active,
            Collection::Known => &self.known,
            Collection::Unknown => &self.unknown,
        }
    }
}

fn read_cards<L: LegacyStorage + ?Sized>(legacy: &L, key: &str) -> StoreResult<Vec<Flashcard>> {
    // An empty value reads as absent, as the browser code treated it.
    match legacy.get_item(key)?.filter(|json| !json.trim().is_empty()) {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::Serialization(format!("legacy {}: {}", key, e))),
        None => Ok(Vec::new()),
    }
}

/// What a completed import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub imported: usize,
    /// Cards whose id was already stored somewhere
    pub skipped: usize,
    pub selected_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    AlreadyMigrated,
    Migrated(MigrationReport),
}

/// Runs the legacy import at most once.
///
/// Share one migrator between every entry point that may bootstrap the store.
/// Concurrent callers queue on an async lock; whoever comes second finds the
/// gate set and returns `AlreadyMigrated`.
pub struct LegacyMigrator {
    done: Mutex<bool>,
}

impl Default for LegacyMigrator {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyMigrator {
    pub fn new() -> Self {
        Self {
            done: Mutex::new(false),
        }
    }

    pub async fn migrate<S, L>(&self, store: &S, legacy: &L) -> StoreResult<MigrationOutcome>
    where
        S: CardStore,
        L: LegacyStorage + ?Sized,
    {
        let mut done = self.done.lock().await;
        if *done {
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        let outcome = migrate_gated(store, legacy).await?;
        *done = true;
        Ok(outcome)
    }
}

/// Import legacy data once.
///
/// Callers anywhere in the process queue on one lock, so concurrent calls
/// import at most once. A [`LegacyMigrator`] additionally remembers
/// completion without reading the gate again.
pub async fn migrate_legacy_data<S, L>(store: &S, legacy: &L) -> StoreResult<MigrationOutcome>
where
    S: CardStore,
    L: LegacyStorage + ?Sized,
{
    migrate_gated(store, legacy).await
}

// Held from the gate check to the gate write.
static MIGRATION_LOCK: Mutex<()> = Mutex::new(());

async fn migrate_gated<S, L>(store: &S, legacy: &L) -> StoreResult<MigrationOutcome>
where
    S: CardStore,
    L: LegacyStorage + ?Sized,
{
    let _guard = MIGRATION_LOCK.lock().await;

    let settings = Settings::new(store);
    if settings.legacy_migrated().await? {
        return Ok(MigrationOutcome::AlreadyMigrated);
    }

    let snapshot = LegacySnapshot::read(legacy)?;
    let report = import(store, &snapshot).await?;
    settings.mark_legacy_migrated().await?;

    info!(
        imported = report.imported,
        skipped = report.skipped,
        "migration from legacy storage completed"
    );
    Ok(MigrationOutcome::Migrated(report))
}

// Put-if-absent across all collections, so an import interrupted before the
// gate was written can run again without DuplicateKey. A collision on `add`
// (another process importing the same data) also counts as skipped.
async fn import<S: CardStore>(store: &S, snapshot: &LegacySnapshot) -> StoreResult<MigrationReport> {
    let mut report = MigrationReport {
        selected_language: snapshot.selected_language.clone(),
        ..Default::default()
    };

    for collection in Collection::ALL {
        for card in snapshot.cards(collection) {
            if let Some(existing) = locate(store, card.id).await? {
                warn!(id = card.id, %existing, "legacy card already stored, skipping");
                report.skipped += 1;
                continue;
            }
            match store.add(collection, card.for_collection(collection)).await {
                Ok(()) => report.imported += 1,
                Err(StoreError::DuplicateKey { .. }) => {
                    warn!(id = card.id, %collection, "legacy card inserted concurrently, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Settings::new(store)
        .save(settings::keys::SELECTED_LANGUAGE, &snapshot.selected_language)
        .await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FlashcardBuilder;

    fn card(id: i64) -> Flashcard {
        FlashcardBuilder::new()
            .id(id)
            .source_text("hola")
            .translated_text("hello")
            .source_lang("Spanish")
            .target_lang("English")
            .build()
    }

    #[test]
    fn test_read_missing_keys() {
        let snapshot = LegacySnapshot::read(&MemoryLegacyStorage::new()).unwrap();
        assert!(snapshot.active.is_empty());
        assert!(snapshot.known.is_empty());
        assert!(snapshot.unknown.is_empty());
        assert_eq!(snapshot.selected_language, "all");
    }

    #[test]
    fn test_read_malformed_json() {
        let mut legacy = MemoryLegacyStorage::new();
        legacy.set_item(keys::KNOWN_CARDS, "[{not json");

        let result = LegacySnapshot::read(&legacy);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_read_empty_values_as_absent() {
        let mut legacy = MemoryLegacyStorage::new();
        legacy.set_item(keys::FLASHCARDS, "");
        legacy.set_item(keys::UNKNOWN_CARDS, "  ");
        legacy.set_item(keys::SELECTED_LANGUAGE, "");

        let snapshot = LegacySnapshot::read(&legacy).unwrap();
        assert!(snapshot.active.is_empty());
        assert!(snapshot.unknown.is_empty());
        assert_eq!(snapshot.selected_language, "all");
    }

    #[test]
    fn test_read_selected_language_is_raw_string() {
        let mut legacy = MemoryLegacyStorage::new();
        legacy.set_item(keys::SELECTED_LANGUAGE, "Spanish");

        let snapshot = LegacySnapshot::read(&legacy).unwrap();
        assert_eq!(snapshot.selected_language, "Spanish");
    }

    #[test]
    fn test_with_cards_round_trip() {
        let legacy = MemoryLegacyStorage::new()
            .with_cards(keys::FLASHCARDS, &[card(1), card(2)])
            .unwrap();

        let snapshot = LegacySnapshot::read(&legacy).unwrap();
        assert_eq!(snapshot.active, vec![card(1), card(2)]);
    }
}
