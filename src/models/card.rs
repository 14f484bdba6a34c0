//! A flashcard as it lives in the card store.
use super::{Flashcard, ReviewState};

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub id: i64,
    pub deck_name: String,
    pub term: String,
    pub definition: String,
    pub review: ReviewState,
    /// Bumped on every review state write; used to detect concurrent updates.
    pub version: i64,
}

impl Card {
    pub fn to_flashcard(&self) -> Flashcard {
        Flashcard {
            term: self.term.clone(),
            definition: self.definition.clone(),
            review: Some(self.review.clone()),
        }
    }
}
