//! Storage abstraction for flashcards
//!
//! This module defines the `CardStore` trait that abstracts over different
//! storage backends. Implementations exist for:
//!
//! - **Memory**: In-memory storage for testing (`MemoryStore`)
//! - **SQLite**: Native SQLite via rusqlite (`flashdeck-sqlite`, native only)
//! - **IndexedDB**: Browser storage via web-sys (`flashdeck-indexeddb`, WASM only)
//!
//! # Example
//!
//! ```rust
//! use flashdeck_core::card::{Collection, FlashcardBuilder};
//! use flashdeck_core::storage::{CardStore, MemoryStore};
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new();
//!
//! let card = FlashcardBuilder::new()
//!     .id(1)
//!     .source_text("hola")
//!     .translated_text("hello")
//!     .source_lang("Spanish")
//!     .target_lang("English")
//!     .build();
//!
//! store.add(Collection::Active, card).await.unwrap();
//! let retrieved = store.get(Collection::Active, 1).await.unwrap();
//! assert!(retrieved.is_some());
//! # });
//! ```

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::CardStore;
