//! SQLite storage backend implementing the CardStore trait

use std::path::Path;

use flashdeck_core::card::{CardId, Collection, Flashcard};
use flashdeck_core::storage::{CardStore, StoreError, StoreResult};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, SqliteError};
use crate::json::{
    card_from_row, deserialize_value, serialize_value, status_to_sql, CARD_COLUMNS,
};

fn table(collection: Collection) -> &'static str {
    match collection {
        Collection::Active => "active_cards",
        Collection::Known => "known_cards",
        Collection::Unknown => "unknown_cards",
    }
}

/// SQLite-backed card store
///
/// The connection sits behind a mutex so the store can be shared by
/// reference (`&self`) across tasks.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store from a connection
    ///
    /// The connection should already have migrations applied.
    /// Use [`crate::migrate::migrate`] to initialize a fresh database.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Create a new in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::migrate::migrate(&conn)?;
        Ok(Self::new(conn))
    }

    /// Open (or create) a file-backed SQLite store, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |reason: String| SqliteError::Open {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| open_error(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| open_error(e.to_string()))?;
        crate::migrate::migrate(&conn)?;

        info!(path = %path.display(), "opened card database");
        Ok(Self::new(conn))
    }

    fn query_cards(conn: &Connection, collection: Collection) -> Result<Vec<Flashcard>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            CARD_COLUMNS,
            table(collection)
        ))?;
        let mut rows = stmt.query([])?;

        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    fn query_card(conn: &Connection, collection: Collection, id: CardId) -> Result<Option<Flashcard>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE id = ?",
            CARD_COLUMNS,
            table(collection)
        ))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => Ok(Some(card_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn upsert_card(conn: &Connection, collection: Collection, card: &Flashcard) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?)",
                table(collection),
                CARD_COLUMNS
            ),
            params![
                card.id,
                card.source_text,
                card.translated_text,
                card.source_lang,
                card.target_lang,
                status_to_sql(card.status),
            ],
        )?;
        Ok(())
    }

    fn delete_card(conn: &Connection, collection: Collection, id: CardId) -> Result<bool> {
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?", table(collection)),
            [id],
        )?;
        Ok(removed > 0)
    }

    fn relocate_in_transaction(&self, card: &Flashcard, destination: Collection) -> Result<Flashcard> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;

        let stored = card.for_collection(destination);
        Self::upsert_card(&tx, destination, &stored)?;
        for other in Collection::ALL {
            if other != destination {
                Self::delete_card(&tx, other, card.id)?;
            }
        }

        tx.commit()?;
        Ok(stored)
    }
}

impl CardStore for SqliteStore {
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<Flashcard>> {
        Ok(Self::query_cards(&self.conn.lock(), collection)?)
    }

    async fn get(&self, collection: Collection, id: CardId) -> StoreResult<Option<Flashcard>> {
        Ok(Self::query_card(&self.conn.lock(), collection, id)?)
    }

    async fn add(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        let conn = self.conn.lock();
        if Self::query_card(&conn, collection, card.id)?.is_some() {
            return Err(StoreError::DuplicateKey {
                collection,
                id: card.id,
            });
        }

        Self::upsert_card(&conn, collection, &card)?;
        debug!(id = card.id, %collection, "card inserted");
        Ok(())
    }

    async fn put(&self, collection: Collection, card: Flashcard) -> StoreResult<()> {
        Self::upsert_card(&self.conn.lock(), collection, &card)?;
        debug!(id = card.id, %collection, "card stored");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: CardId) -> StoreResult<bool> {
        let removed = Self::delete_card(&self.conn.lock(), collection, id)?;
        debug!(id, %collection, removed, "card delete");
        Ok(removed)
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.conn
            .lock()
            .execute(&format!("DELETE FROM {}", table(collection)), [])
            .map_err(SqliteError::from)?;
        debug!(%collection, "collection cleared");
        Ok(())
    }

    async fn count(&self, collection: Collection) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", table(collection)),
                [],
                |row| row.get(0),
            )
            .map_err(SqliteError::from)?;
        Ok(count as usize)
    }

    async fn setting(&self, key: &str) -> StoreResult<Option<Value>> {
        let json: Option<String> = self
            .conn
            .lock()
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(SqliteError::from)?;

        match json {
            Some(json) => Ok(Some(deserialize_value(&json)?)),
            None => Ok(None),
        }
    }

    async fn save_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        let json = serialize_value(&value)?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, json],
            )
            .map_err(SqliteError::from)?;
        debug!(key, "setting saved");
        Ok(())
    }

    /// All-or-nothing: the insert and both removals commit together.
    async fn relocate(&self, card: &Flashcard, destination: Collection) -> StoreResult<Flashcard> {
        let stored = self.relocate_in_transaction(card, destination)?;
        debug!(id = card.id, %destination, "card relocated");
        Ok(stored)
    }
}
