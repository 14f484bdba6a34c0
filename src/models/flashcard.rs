//! Flashcard is a pair <term, definition>, optionally carrying its review state
use super::ReviewState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
    /// Absent for cards that were never studied, e.g. in hand-written decks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewState>,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            review: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("hola", "hello");

        assert_eq!(card.term, "hola");
        assert_eq!(card.definition, "hello");
        assert!(card.review.is_none());
    }

    #[test]
    fn test_unstudied_card_omits_review() {
        let json = serde_json::to_string(&Flashcard::new("gato", "cat")).unwrap();
        assert_eq!(json, r#"{"term":"gato","definition":"cat"}"#);
    }
}
