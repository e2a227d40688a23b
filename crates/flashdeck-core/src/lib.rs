//! flashdeck core
//!
//! The persistence contract and card lifecycle behind the practice loop,
//! designed to run identically in the browser (WASM, IndexedDB) and natively
//! (SQLite, CLI).
//!
//! A card lives in exactly one of three collections (active, known, unknown).
//! Lifecycle operations move it between them through any [`CardStore`]
//! backend while keeping that invariant.
//!
//! # Features
//!
//! - `wasm` - WASM-compatible build (card ids from the JS clock)
//!
//! # Example
//!
//! ```rust
//! use flashdeck_core::card::{Collection, FlashcardBuilder};
//! use flashdeck_core::lifecycle::{add_card, move_card, snapshot};
//! use flashdeck_core::storage::MemoryStore;
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new();
//! let card = FlashcardBuilder::new()
//!     .id(1)
//!     .source_text("hola")
//!     .translated_text("hello")
//!     .source_lang("Spanish")
//!     .target_lang("English")
//!     .build();
//!
//! add_card(&store, card.clone()).await.unwrap();
//! move_card(&store, &card, Collection::Known).await.unwrap();
//!
//! let deck = snapshot(&store).await.unwrap();
//! assert!(deck.active.is_empty());
//! assert_eq!(deck.known.len(), 1);
//! # });
//! ```

pub mod card;
pub mod language;
pub mod legacy;
pub mod lifecycle;
pub mod practice;
pub mod settings;
pub mod storage;

// Re-export main types at crate root
pub use card::{CardId, CardStatus, Collection, DeckSnapshot, Flashcard, FlashcardBuilder};
pub use language::{available_languages, LanguageFilter};
pub use legacy::{
    migrate_legacy_data, LegacyMigrator, LegacySnapshot, LegacyStorage, MemoryLegacyStorage,
    MigrationOutcome, MigrationReport,
};
pub use lifecycle::{
    add_card, delete_card, move_card, practice_unknown, reset_all, snapshot, PracticeOutcome,
};
pub use practice::PracticeQueue;
pub use settings::Settings;
pub use storage::{CardStore, MemoryStore, StoreError, StoreResult};
