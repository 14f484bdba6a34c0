//! Container for all available decks
use super::Deck;

#[derive(Clone, Debug, Default)]
pub struct DeckSet {
    pub decks: Vec<Deck>,
}

impl DeckSet {
    pub fn total_cards(&self) -> usize {
        self.decks.iter().map(|deck| deck.flashcards.len()).sum()
    }
}
