//! Flashcard records and the collections that hold them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::language::available_languages;

/// Card identifier. Assigned at creation from the wall clock (milliseconds).
pub type CardId = i64;

/// Review outcome carried by a card outside the active collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Known,
    Unknown,
}

impl CardStatus {
    /// The collection a card with this status lives in.
    pub fn collection(self) -> Collection {
        match self {
            CardStatus::Known => Collection::Known,
            CardStatus::Unknown => Collection::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::Known => "known",
            CardStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three card collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Active,
    Known,
    Unknown,
}

impl Collection {
    /// All card collections, in lookup order.
    pub const ALL: [Collection; 3] = [Collection::Active, Collection::Known, Collection::Unknown];

    /// Persisted collection name (IndexedDB object store name).
    pub fn name(self) -> &'static str {
        match self {
            Collection::Active => "active-cards",
            Collection::Known => "known-cards",
            Collection::Unknown => "unknown-cards",
        }
    }

    /// Status carried by cards held in this collection.
    pub fn status(self) -> Option<CardStatus> {
        match self {
            Collection::Active => None,
            Collection::Known => Some(CardStatus::Known),
            Collection::Unknown => Some(CardStatus::Unknown),
        }
    }

    /// Whether a card held here may move to `to`.
    ///
    /// Staying put is always allowed. known and unknown only connect through active.
    pub fn can_transition_to(self, to: Collection) -> bool {
        self == to || self == Collection::Active || to == Collection::Active
    }

    /// Parse a destination name (`active`, `known`, `unknown`, or a persisted name).
    pub fn parse(s: &str) -> Option<Collection> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "active-cards" => Some(Collection::Active),
            "known" | "known-cards" => Some(Collection::Known),
            "unknown" | "unknown-cards" => Some(Collection::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Option<CardStatus>> for Collection {
    fn from(status: Option<CardStatus>) -> Self {
        status.map_or(Collection::Active, CardStatus::collection)
    }
}

/// A translated snippet drilled in practice.
///
/// Field names serialize in camelCase so records written by the web front-end
/// and by the legacy flat storage decode unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: CardId,
    pub source_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub status: Option<CardStatus>,
}

impl Flashcard {
    /// Create a new active card, stamped with the current time as its id.
    pub fn new(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            id: chrono::Utc::now().timestamp_millis(),
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            status: None,
        }
    }

    /// Copy of this card carrying the status of `collection`.
    pub fn for_collection(&self, collection: Collection) -> Flashcard {
        Flashcard {
            status: collection.status(),
            ..self.clone()
        }
    }
}

/// Builder for creating flashcards with explicit ids
#[derive(Debug, Default)]
pub struct FlashcardBuilder {
    card: Flashcard,
}

impl FlashcardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: CardId) -> Self {
        self.card.id = id;
        self
    }

    pub fn source_text(mut self, text: impl Into<String>) -> Self {
        self.card.source_text = text.into();
        self
    }

    pub fn translated_text(mut self, text: impl Into<String>) -> Self {
        self.card.translated_text = text.into();
        self
    }

    pub fn source_lang(mut self, lang: impl Into<String>) -> Self {
        self.card.source_lang = lang.into();
        self
    }

    pub fn target_lang(mut self, lang: impl Into<String>) -> Self {
        self.card.target_lang = lang.into();
        self
    }

    pub fn status(mut self, status: Option<CardStatus>) -> Self {
        self.card.status = status;
        self
    }

    pub fn build(self) -> Flashcard {
        self.card
    }
}

/// The three card collections read back after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSnapshot {
    pub active: Vec<Flashcard>,
    pub known: Vec<Flashcard>,
    pub unknown: Vec<Flashcard>,
}

impl DeckSnapshot {
    pub fn cards(&self, collection: Collection) -> &[Flashcard] {
        match collection {
            Collection::Active => &self.active,
            Collection::Known => &self.known,
            Collection::Unknown => &self.unknown,
        }
    }

    /// Every card across the three collections.
    pub fn all(&self) -> impl Iterator<Item = &Flashcard> {
        self.active
            .iter()
            .chain(self.known.iter())
            .chain(self.unknown.iter())
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.known.len() + self.unknown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collection currently holding `id`, if any.
    pub fn locate(&self, id: CardId) -> Option<Collection> {
        Collection::ALL
            .into_iter()
            .find(|c| self.cards(*c).iter().any(|card| card.id == id))
    }

    /// Distinct languages across all cards.
    pub fn languages(&self) -> Vec<String> {
        available_languages(self.all())
    }
}
