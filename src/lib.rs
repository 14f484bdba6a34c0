//! Flashcard decks scheduled with the SM-2 spaced repetition algorithm.
//!
//! - [`models::sm2`] holds the scheduler: pure functions from a card's
//!   [`ReviewState`] and a [`Quality`] rating to its next state
//! - [`database`] persists decks, cards, review state and review logs in SQLite
//! - [`export`] reads and writes decks as JSON
//! - [`config`] loads the TOML configuration used by the command line tool

pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{CardError, Result};
pub use models::{Card, Deck, DeckSet, Flashcard, LearningSession, Quality, Rating, ReviewState};
