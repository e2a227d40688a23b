//! IndexedDB storage backend for flashdeck (browser WASM)
//!
//! This crate provides a persistent IndexedDB implementation of the
//! flashdeck-core [`CardStore`](flashdeck_core::CardStore) trait, plus a
//! `localStorage` reader for the one-time legacy import.
//!
//! # Schema
//!
//! Database `language-learning-db`, version 1:
//!
//! | object store    | keyPath |
//! |-----------------|---------|
//! | `active-cards`  | `id`    |
//! | `known-cards`   | `id`    |
//! | `unknown-cards` | `id`    |
//! | `settings`      | `key`   |
//!
//! Cards are plain objects `{id, sourceText, translatedText, sourceLang,
//! targetLang, status}`; settings are `{key, value}` with any JSON value.
//!
//! # Example
//!
//! ```rust,ignore
//! use flashdeck_core::{add_card, move_card, Collection, Flashcard};
//! use flashdeck_indexeddb::IndexedDbStore;
//!
//! let store = IndexedDbStore::open_default().await?;
//!
//! let card = Flashcard::new("hola", "hello", "Spanish", "English");
//! add_card(&store, card.clone()).await?;
//! move_card(&store, &card, Collection::Known).await?;
//! ```

pub mod error;
pub mod idb;
pub mod legacy;
pub mod store;

pub use error::{IndexedDbError, Result};
pub use idb::DEFAULT_DB_NAME;
pub use legacy::LocalStorage;
pub use store::IndexedDbStore;
