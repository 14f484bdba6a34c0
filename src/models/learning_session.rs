//! Learning session management for spaced repetition practice.
//! Handles multi-round flashcard review with SM-2 algorithm integration.

use super::{Card, Quality, Rating, sm2};
use crate::database::db;
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, info};

/// A card being studied, with whether it was passed in the current round.
#[derive(Clone, Debug)]
pub struct SessionCard {
    pub card: Card,
    pub passed: bool,
}

/// Manages a learning session with multiple review rounds.
/// Cards that aren't mastered (grade < 3) are repeated in subsequent rounds.
pub struct LearningSession {
    pub deck_name: String,
    pub today: NaiveDate,
    pub all_cards: Vec<SessionCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_definition: bool,
    pub round_number: usize,
}

impl LearningSession {
    /// Creates a new learning session from cards that are due for review.
    /// `max_cards` of 0 means no limit.
    pub fn new_from_due_cards(deck_name: String, cards: Vec<Card>, today: NaiveDate, max_cards: usize) -> Self {
        let limit = if max_cards == 0 { cards.len() } else { max_cards };
        let all_cards: Vec<SessionCard> = cards
            .into_iter()
            .take(limit)
            .map(|card| SessionCard { card, passed: false })
            .collect();

        let indices: Vec<usize> = (0..all_cards.len()).collect();
        info!(deck = %deck_name, cards = indices.len(), %today, "learning session started");

        Self {
            deck_name,
            today,
            all_cards,
            current_round_cards: indices,
            current_index: 0,
            show_definition: false,
            round_number: 1,
        }
    }

    /// Loads the due cards of `deck_name` and starts a session over them.
    pub fn start(deck_name: &str, today: NaiveDate, max_cards: usize, conn: &Connection) -> Result<Self> {
        let cards = db::get_flashcards_due_for_review(deck_name, today, conn)?;
        Ok(Self::new_from_due_cards(deck_name.to_string(), cards, today, max_cards))
    }

    fn current(&self) -> Option<&SessionCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current().map(|entry| &entry.card)
    }

    pub fn toggle_definition(&mut self) {
        self.show_definition = !self.show_definition;
    }

    /// Next interval for each answer button on the current card.
    pub fn preview_current(&self) -> Option<[(Rating, u32); 4]> {
        self.current_card()
            .map(|card| sm2::preview_ratings(&card.review, self.today))
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_definition = false;
        } else {
            // End of round - check if there are cards to review
            self.start_next_round();
        }
    }

    /// Starts a new round with cards that weren't mastered (grade < 3).
    /// If no cards remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| self.all_cards.get(idx).is_some_and(|entry| !entry.passed))
            .collect();

        if failed_indices.is_empty() {
            info!(deck = %self.deck_name, rounds = self.round_number, "learning session completed");
            return;
        }

        self.current_round_cards = failed_indices;
        self.current_index = 0;
        self.show_definition = false;
        self.round_number += 1;
        debug!(round = self.round_number, cards = self.current_round_cards.len(), "starting review round");
    }

    /// Grades the current card, stores its SM-2 update and review log entry.
    /// Cards with grade >= 3 are marked as learned for this session.
    pub fn grade_current_card(
        &mut self,
        quality: Quality,
        time_spent_ms: Option<u64>,
        conn: &mut Connection,
    ) -> Result<()> {
        let Some(&actual_idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(());
        };
        let Some(entry) = self.all_cards.get_mut(actual_idx) else {
            return Ok(());
        };

        let updated = db::submit_review(entry.card.id, quality, time_spent_ms, self.today, conn)?;
        entry.card = updated;
        entry.passed = quality.is_pass();
        Ok(())
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.all_cards.get(idx).is_some_and(|entry| entry.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Returns true when all cards have been mastered or current round is empty.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
