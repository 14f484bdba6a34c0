#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use velum_cards::database::db;

pub const DECK: &str = "Spanish";

/// Fresh in-memory store with one empty deck named [`DECK`].
pub fn test_db() -> Connection {
    let conn = db::open_memory_database().unwrap();
    db::new_deck(DECK, &conn).unwrap();
    conn
}

/// Store with [`DECK`] holding the given `(term, definition)` pairs. Returns the card IDs in order.
pub fn test_db_with_cards(cards: &[(&str, &str)]) -> (Connection, Vec<i64>) {
    let conn = test_db();
    let ids = cards
        .iter()
        .map(|(term, definition)| db::add_flashcard(DECK, term, definition, &conn).unwrap())
        .collect();
    (conn, ids)
}

/// Dates in March 2025, by day of month.
pub fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}
