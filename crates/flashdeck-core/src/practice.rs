//! Practice queue
//!
//! The cursor over active cards that a practice view steps through. Marking
//! the current card moves it in the store and drops it from the queue.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{CardStatus, Flashcard};
use crate::language::LanguageFilter;
use crate::lifecycle::move_card;
use crate::storage::{CardStore, StoreResult};

#[derive(Debug, Clone, Default)]
pub struct PracticeQueue {
    cards: Vec<Flashcard>,
    filter: LanguageFilter,
    index: usize,
}

impl PracticeQueue {
    /// Queue of the active cards passing `filter`, cursor on the first.
    pub fn new(active: &[Flashcard], filter: LanguageFilter) -> Self {
        Self {
            cards: filter.apply(active),
            filter,
            index: 0,
        }
    }

    /// Rebuild from `active` with a new filter and rewind the cursor.
    pub fn set_filter(&mut self, active: &[Flashcard], filter: LanguageFilter) {
        *self = Self::new(active, filter);
    }

    pub fn filter(&self) -> &LanguageFilter {
        &self.filter
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    /// Advance, wrapping to the first card after the last.
    pub fn next(&mut self) -> Option<&Flashcard> {
        if !self.cards.is_empty() {
            self.index = (self.index + 1) % self.cards.len();
        }
        self.current()
    }

    /// Step back, wrapping to the last card before the first.
    pub fn previous(&mut self) -> Option<&Flashcard> {
        if !self.cards.is_empty() {
            self.index = self
                .index
                .checked_sub(1)
                .unwrap_or(self.cards.len() - 1);
        }
        self.current()
    }

    /// Shuffle the queue order. The cursor stays at the same position.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Move the current card to the collection for `status` and drop it from
    /// the queue. Returns the card as stored, or `None` on an empty queue.
    ///
    /// On a store error the queue is left unchanged.
    pub async fn mark_current<S: CardStore>(
        &mut self,
        store: &S,
        status: CardStatus,
    ) -> StoreResult<Option<Flashcard>> {
        let Some(card) = self.current() else {
            return Ok(None);
        };

        let stored = move_card(store, card, status.collection()).await?;
        self.cards.remove(self.index);
        if self.index >= self.cards.len() && !self.cards.is_empty() {
            self.index = self.cards.len() - 1;
        }
        if self.cards.is_empty() {
            self.index = 0;
        }
        Ok(Some(stored))
    }
}
