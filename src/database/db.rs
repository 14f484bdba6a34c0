//! Database operations for the flashcard store
//!
//! Handles SQLite database initialization, CRUD operations for decks and flashcards,
//! SM-2 review state, the review log and the simulated study date.
//!
//! Review state rows carry a `version` counter. Writers pass the version they
//! read and the update is refused with [`CardError::Conflict`] when another
//! session got there first.

use crate::error::{CardError, Result};
use crate::models::{Card, Deck, DeckSet, Flashcard, Quality, ReviewLog, ReviewState, sm2};
use chrono::{Days, NaiveDate};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior, params};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS decks (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS flashcards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        deck_name TEXT NOT NULL,
        term TEXT NOT NULL,
        definition TEXT NOT NULL,
        FOREIGN KEY (deck_name) REFERENCES decks(name) ON DELETE CASCADE,
        UNIQUE(deck_name, term)
    );

    CREATE TABLE IF NOT EXISTS review_state (
        flashcard_id INTEGER PRIMARY KEY,
        interval_days INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        due_date TEXT,
        version INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        flashcard_id INTEGER NOT NULL,
        reviewed_on TEXT NOT NULL,
        quality INTEGER NOT NULL,
        time_spent_ms INTEGER,
        FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_review_log_card ON review_log(flashcard_id);

    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

const CARD_COLUMNS: &str = "f.id, f.deck_name, f.term, f.definition,
    r.interval_days, r.repetitions, r.ease_factor, r.due_date, r.version";

const SIMULATED_DATE_KEY: &str = "simulated_date";

/// Opens (or creates) the database file and makes sure all tables exist.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    init_schema(&conn)?;

    info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// In-memory database with the full schema, for tests and dry runs.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for decks, flashcards, review state, review log and app state.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Simulated "today", if one was set with [`advance_day`].
pub fn get_simulated_date(conn: &Connection) -> Result<Option<NaiveDate>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![SIMULATED_DATE_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value.map(|v| crate::clock::parse_date(&v)).transpose()
}

/// Moves the simulated date one day forward, starting from `today` when no
/// simulated date is set yet. Returns the new simulated date.
pub fn advance_day(today: NaiveDate, conn: &Connection) -> Result<NaiveDate> {
    let current = get_simulated_date(conn)?.unwrap_or(today);
    let next = current
        .checked_add_days(Days::new(1))
        .ok_or_else(|| CardError::InvalidDate(current.to_string()))?;

    conn.execute(
        "INSERT INTO app_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![SIMULATED_DATE_KEY, next.format("%Y-%m-%d").to_string()],
    )?;

    info!(date = %next, "advanced simulated date");
    Ok(next)
}

/// Drops the simulated date so the real calendar is used again.
pub fn reset_simulated_date(conn: &Connection) -> Result<()> {
    conn.execute(
        "DELETE FROM app_state WHERE key = ?1",
        params![SIMULATED_DATE_KEY],
    )?;
    Ok(())
}

pub fn deck_exists(name: &str, conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM decks WHERE name = ?1", params![name], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Creates a new deck in the database
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    if deck_exists(name, conn)? {
        return Err(CardError::DeckExists(name.to_string()));
    }
    conn.execute("INSERT INTO decks (name) VALUES (?1)", params![name])?;
    info!(deck = name, "deck created");
    Ok(())
}

/// Deletes a deck together with its cards, review state and review log.
pub fn delete_deck(name: &str, conn: &Connection) -> Result<()> {
    let removed = conn.execute("DELETE FROM decks WHERE name = ?1", params![name])?;
    if removed == 0 {
        return Err(CardError::DeckNotFound(name.to_string()));
    }
    info!(deck = name, "deck deleted");
    Ok(())
}

/// Retrieves all deck names from database
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(decks)
}

/// Adds a new, never-reviewed flashcard to a deck.
///
/// Returns the flashcard ID. If a card with the same term already exists in
/// the deck, its ID is returned and nothing is changed.
pub fn add_flashcard(deck_name: &str, term: &str, definition: &str, conn: &Connection) -> Result<i64> {
    insert_flashcard(deck_name, &Flashcard::new(term, definition), conn)
}

/// Adds a flashcard and its review state, defaulting to a new card when the
/// flashcard carries none.
pub fn insert_flashcard(deck_name: &str, flashcard: &Flashcard, conn: &Connection) -> Result<i64> {
    if !deck_exists(deck_name, conn)? {
        return Err(CardError::DeckNotFound(deck_name.to_string()));
    }

    conn.execute(
        "INSERT OR IGNORE INTO flashcards (deck_name, term, definition) VALUES (?1, ?2, ?3)",
        params![deck_name, flashcard.term, flashcard.definition],
    )?;

    let flashcard_id: i64 = conn.query_row(
        "SELECT id FROM flashcards WHERE deck_name = ?1 AND term = ?2",
        params![deck_name, flashcard.term],
        |row| row.get(0),
    )?;

    let state = flashcard.review.clone().unwrap_or_default();
    conn.execute(
        "INSERT OR IGNORE INTO review_state (flashcard_id, interval_days, repetitions, ease_factor, due_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            flashcard_id,
            state.interval,
            state.repetitions,
            state.ease_factor,
            state.due_date
        ],
    )?;

    debug!(deck = deck_name, id = flashcard_id, term = %flashcard.term, "flashcard stored");
    Ok(flashcard_id)
}

pub fn delete_flashcard(card_id: i64, conn: &Connection) -> Result<()> {
    let removed = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![card_id])?;
    if removed == 0 {
        return Err(CardError::CardNotFound(card_id));
    }
    info!(id = card_id, "flashcard deleted");
    Ok(())
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        deck_name: row.get(1)?,
        term: row.get(2)?,
        definition: row.get(3)?,
        review: ReviewState {
            interval: row.get(4)?,
            repetitions: row.get(5)?,
            ease_factor: row.get(6)?,
            due_date: row.get(7)?,
        },
        version: row.get(8)?,
    })
}

pub fn get_card(card_id: i64, conn: &Connection) -> Result<Card> {
    let sql = format!(
        "SELECT {CARD_COLUMNS}
         FROM flashcards f
         JOIN review_state r ON f.id = r.flashcard_id
         WHERE f.id = ?1"
    );
    conn.query_row(&sql, params![card_id], card_from_row)
        .optional()?
        .ok_or(CardError::CardNotFound(card_id))
}

/// Retrieves all cards of a deck with their review state, in insertion order.
pub fn get_cards_for_deck(deck_name: &str, conn: &Connection) -> Result<Vec<Card>> {
    if !deck_exists(deck_name, conn)? {
        return Err(CardError::DeckNotFound(deck_name.to_string()));
    }

    let sql = format!(
        "SELECT {CARD_COLUMNS}
         FROM flashcards f
         JOIN review_state r ON f.id = r.flashcard_id
         WHERE f.deck_name = ?1
         ORDER BY f.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![deck_name], card_from_row)?
        .collect::<rusqlite::Result<Vec<Card>>>()?;
    Ok(cards)
}

/// Retrieves cards of a deck that are due on `today`
///
/// New cards come first, then the rest ordered by due date (oldest first).
pub fn get_flashcards_due_for_review(deck_name: &str, today: NaiveDate, conn: &Connection) -> Result<Vec<Card>> {
    let mut due: Vec<Card> = get_cards_for_deck(deck_name, conn)?
        .into_iter()
        .filter(|card| sm2::is_due(card.review.due_date, today))
        .collect();
    due.sort_by_key(|card| (card.review.due_date, card.id));

    debug!(deck = deck_name, %today, due = due.len(), "collected due cards");
    Ok(due)
}

/// Writes a new review state if the stored version still equals
/// `expected_version`. Returns the new version.
pub fn update_review_state(
    card_id: i64,
    state: &ReviewState,
    expected_version: i64,
    conn: &Connection,
) -> Result<i64> {
    let updated = conn.execute(
        "UPDATE review_state
         SET interval_days = ?1, repetitions = ?2, ease_factor = ?3, due_date = ?4,
             version = version + 1
         WHERE flashcard_id = ?5 AND version = ?6",
        params![
            state.interval,
            state.repetitions,
            state.ease_factor,
            state.due_date,
            card_id,
            expected_version
        ],
    )?;

    if updated == 0 {
        // Distinguish a missing card from a lost race
        get_card(card_id, conn)?;
        return Err(CardError::Conflict(card_id));
    }
    Ok(expected_version + 1)
}

pub fn append_review_log(log: &ReviewLog, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_log (flashcard_id, reviewed_on, quality, time_spent_ms)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            log.flashcard_id,
            log.date,
            log.quality,
            log.time_spent_ms.map(|ms| i64::try_from(ms).unwrap_or(i64::MAX))
        ],
    )?;
    Ok(())
}

fn review_log_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewLog> {
    let time_spent_ms: Option<i64> = row.get(3)?;
    Ok(ReviewLog {
        flashcard_id: row.get(0)?,
        date: row.get(1)?,
        quality: row.get(2)?,
        time_spent_ms: time_spent_ms.map(|ms| ms.max(0) as u64),
    })
}

/// Review history, oldest first, for one deck or for every deck.
pub fn get_review_logs(deck_name: Option<&str>, conn: &Connection) -> Result<Vec<ReviewLog>> {
    let mut stmt = conn.prepare(
        "SELECT l.flashcard_id, l.reviewed_on, l.quality, l.time_spent_ms
         FROM review_log l
         JOIN flashcards f ON f.id = l.flashcard_id
         WHERE ?1 IS NULL OR f.deck_name = ?1
         ORDER BY l.reviewed_on, l.id",
    )?;
    let logs = stmt
        .query_map(params![deck_name], review_log_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(logs)
}

pub fn get_review_logs_for_card(card_id: i64, conn: &Connection) -> Result<Vec<ReviewLog>> {
    let mut stmt = conn.prepare(
        "SELECT flashcard_id, reviewed_on, quality, time_spent_ms
         FROM review_log
         WHERE flashcard_id = ?1
         ORDER BY reviewed_on, id",
    )?;
    let logs = stmt
        .query_map(params![card_id], review_log_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(logs)
}

/// Maps a lock timeout while reviewing `card_id` to [`CardError::Conflict`].
fn busy_as_conflict(card_id: i64) -> impl Fn(rusqlite::Error) -> CardError {
    move |err| match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => CardError::Conflict(card_id),
        _ => CardError::Database(err),
    }
}

/// Records one review of a card: schedules it with SM-2, stores the new state
/// and appends a review log entry, all in one transaction.
///
/// The write lock is taken before the card is read, so concurrent reviews of
/// the same card queue behind the connection's busy timeout and each one
/// schedules from fresh state. If the lock cannot be had in time the review
/// fails with [`CardError::Conflict`].
///
/// Returns the card with its updated state.
pub fn submit_review(
    card_id: i64,
    quality: Quality,
    time_spent_ms: Option<u64>,
    today: NaiveDate,
    conn: &mut Connection,
) -> Result<Card> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(busy_as_conflict(card_id))?;

    let card = get_card(card_id, &tx)?;
    let next = sm2::calculate_next_review(&card.review, quality, today);
    let version = update_review_state(card_id, &next, card.version, &tx)?;

    append_review_log(
        &ReviewLog {
            flashcard_id: card_id,
            date: today,
            quality: quality.value(),
            time_spent_ms,
        },
        &tx,
    )?;
    tx.commit().map_err(busy_as_conflict(card_id))?;

    info!(
        id = card_id,
        quality = quality.value(),
        interval = next.interval,
        repetitions = next.repetitions,
        ease_factor = next.ease_factor,
        "review recorded"
    );

    Ok(Card {
        review: next,
        version,
        ..card
    })
}

/// Stores a whole deck, e.g. one read from a JSON export. Fails without
/// changes if a deck with the same name exists. Returns the number of cards.
pub fn import_deck(deck: &Deck, conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    new_deck(&deck.name, &tx)?;
    for flashcard in &deck.flashcards {
        insert_flashcard(&deck.name, flashcard, &tx)?;
    }
    tx.commit()?;

    info!(deck = %deck.name, cards = deck.flashcards.len(), "deck imported");
    Ok(deck.flashcards.len())
}

/// Loads one deck with its cards and their review state.
pub fn load_deck(deck_name: &str, conn: &Connection) -> Result<Deck> {
    let flashcards = get_cards_for_deck(deck_name, conn)?
        .iter()
        .map(Card::to_flashcard)
        .collect();

    Ok(Deck::new(deck_name, flashcards))
}

/// Loads all decks with their flashcards into memory
pub fn load_all_decks(conn: &Connection) -> Result<DeckSet> {
    let decks = get_all_decks(conn)?
        .iter()
        .map(|name| load_deck(name, conn))
        .collect::<Result<Vec<_>>>()?;
    Ok(DeckSet { decks })
}
