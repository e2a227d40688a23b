//! SQLite storage backend for flashdeck
//!
//! This crate provides a persistent SQLite implementation of the
//! flashdeck-core [`CardStore`](flashdeck_core::CardStore) trait, used by the
//! command-line front-end and any other native host.
//!
//! # Features
//!
//! - One table per card collection plus a JSON-valued `settings` table
//! - Embedded, versioned schema migrations
//! - Card relocation inside a single SQL transaction
//! - Supports in-memory databases for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use flashdeck_core::{add_card, move_card, snapshot, Collection, FlashcardBuilder};
//! use flashdeck_sqlite::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # futures::executor::block_on(async {
//! let store = SqliteStore::open("flashdeck.db")?;
//!
//! let card = FlashcardBuilder::new()
//!     .id(1)
//!     .source_text("hola")
//!     .translated_text("hello")
//!     .source_lang("Spanish")
//!     .target_lang("English")
//!     .build();
//!
//! add_card(&store, card.clone()).await?;
//! move_card(&store, &card, Collection::Known).await?;
//!
//! let deck = snapshot(&store).await?;
//! assert_eq!(deck.known.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # })?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod json;
pub mod migrate;
pub mod store;

// Re-export main types
pub use error::{Result, SqliteError};
pub use store::SqliteStore;
