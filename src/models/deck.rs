//! A named list of flashcards, the unit of import and export
use super::Flashcard;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub flashcards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(name: impl Into<String>, flashcards: Vec<Flashcard>) -> Self {
        Self {
            name: name.into(),
            flashcards,
        }
    }

    /// Cards without state or with a new one, as counted by `DeckOverview::new`.
    pub fn new_count(&self) -> usize {
        self.flashcards
            .iter()
            .filter(|card| card.review.as_ref().is_none_or(|review| review.is_new()))
            .count()
    }
}
