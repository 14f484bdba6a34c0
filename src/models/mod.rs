pub mod card;
pub mod deck;
pub mod deck_set;
pub mod flashcard;
pub mod learning_session;
pub mod quality;
pub mod review_state;
pub mod sm2;
pub mod stats;

pub use card::Card;
pub use deck::Deck;
pub use deck_set::DeckSet;
pub use flashcard::Flashcard;
pub use learning_session::LearningSession;
pub use quality::{Quality, Rating};
pub use review_state::{ReviewLog, ReviewState};
pub use stats::{DeckOverview, StudyStats};
