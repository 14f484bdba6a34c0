mod helpers;

use helpers::{DECK, march, test_db_with_cards};
use rusqlite::Connection;
use std::time::Duration;
use velum_cards::database::db;
use velum_cards::models::stats::StudyStats;
use velum_cards::{CardError, Quality};

fn q(value: i64) -> Quality {
    Quality::new(value).unwrap()
}

#[test]
fn submit_review_persists_state_and_log() {
    let (mut conn, ids) = test_db_with_cards(&[("perro", "dog")]);

    let card = db::submit_review(ids[0], q(4), Some(3500), march(1), &mut conn).unwrap();
    assert_eq!(card.review.interval, 1);
    assert_eq!(card.review.repetitions, 1);
    assert_eq!(card.review.due_date, Some(march(2)));
    assert_eq!(card.version, 1);

    let stored = db::get_card(ids[0], &conn).unwrap();
    assert_eq!(stored, card);

    let logs = db::get_review_logs_for_card(ids[0], &conn).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].date, march(1));
    assert_eq!(logs[0].quality, 4);
    assert_eq!(logs[0].time_spent_ms, Some(3500));
}

#[test]
fn card_follows_the_sm2_ladder() {
    let (mut conn, ids) = test_db_with_cards(&[("gato", "cat")]);
    let id = ids[0];

    let first = db::submit_review(id, q(4), None, march(1), &mut conn).unwrap();
    let second = db::submit_review(id, q(4), None, march(2), &mut conn).unwrap();
    let third = db::submit_review(id, q(4), None, march(8), &mut conn).unwrap();

    assert_eq!(first.review.interval, 1);
    assert_eq!(second.review.interval, 6);
    assert_eq!(second.review.due_date, Some(march(8)));
    assert_eq!(third.review.interval, 15);
    assert_eq!(third.review.repetitions, 3);
    assert_eq!(third.review.due_date, Some(march(23)));

    let lapse = db::submit_review(id, q(0), None, march(23), &mut conn).unwrap();
    assert_eq!(lapse.review.interval, 1);
    assert_eq!(lapse.review.repetitions, 0);
    assert!((lapse.review.ease_factor - 1.7).abs() < 1e-9);
    assert_eq!(lapse.version, 4);
}

#[test]
fn unknown_card_is_reported() {
    let (mut conn, _) = test_db_with_cards(&[]);
    let err = db::submit_review(42, q(3), None, march(1), &mut conn).unwrap_err();
    assert!(matches!(err, CardError::CardNotFound(42)));
}

#[test]
fn second_session_with_stale_state_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.db");

    let mut first = db::open_database(&path).unwrap();
    db::new_deck(DECK, &first).unwrap();
    let id = db::add_flashcard(DECK, "casa", "house", &first).unwrap();

    // Both sessions read the card before either writes
    let second = Connection::open(&path).unwrap();
    let seen_by_second = db::get_card(id, &second).unwrap();

    db::submit_review(id, q(5), None, march(1), &mut first).unwrap();

    let stale = velum_cards::models::sm2::calculate_next_review(&seen_by_second.review, q(1), march(1));
    let err = db::update_review_state(id, &stale, seen_by_second.version, &second).unwrap_err();
    assert!(matches!(err, CardError::Conflict(card_id) if card_id == id));

    // The first session's update survives
    let stored = db::get_card(id, &first).unwrap();
    assert_eq!(stored.review.repetitions, 1);
    assert_eq!(stored.version, 1);
}

#[test]
fn review_while_another_session_holds_the_write_lock_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.db");

    let mut first = db::open_database(&path).unwrap();
    first.busy_timeout(Duration::from_millis(50)).unwrap();
    db::new_deck(DECK, &first).unwrap();
    let id = db::add_flashcard(DECK, "mesa", "table", &first).unwrap();

    // The second session is midway through its own review of the card
    let second = Connection::open(&path).unwrap();
    second.execute_batch("BEGIN").unwrap();
    let seen = db::get_card(id, &second).unwrap();
    let next = velum_cards::models::sm2::calculate_next_review(&seen.review, q(5), march(1));
    db::update_review_state(id, &next, seen.version, &second).unwrap();

    let err = db::submit_review(id, q(4), None, march(1), &mut first).unwrap_err();
    assert!(matches!(err, CardError::Conflict(card_id) if card_id == id));

    second.execute_batch("COMMIT").unwrap();

    // Retrying schedules from the state the second session committed
    let card = db::submit_review(id, q(4), None, march(2), &mut first).unwrap();
    assert_eq!(card.review.repetitions, 2);
    assert_eq!(card.review.interval, 6);
    assert_eq!(card.version, 2);

    let logs = db::get_review_logs_for_card(id, &first).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].date, march(2));
}

#[test]
fn due_list_respects_day_granularity() {
    let (mut conn, ids) = test_db_with_cards(&[("uno", "one"), ("dos", "two"), ("tres", "three")]);

    // uno due tomorrow, dos due today, tres never reviewed
    db::submit_review(ids[0], q(4), None, march(10), &mut conn).unwrap();
    db::submit_review(ids[1], q(4), None, march(9), &mut conn).unwrap();

    let due = db::get_flashcards_due_for_review(DECK, march(10), &conn).unwrap();
    let terms: Vec<&str> = due.iter().map(|card| card.term.as_str()).collect();
    assert_eq!(terms, ["tres", "dos"]);

    let later = db::get_flashcards_due_for_review(DECK, march(11), &conn).unwrap();
    assert_eq!(later.len(), 3);
}

#[test]
fn due_list_for_missing_deck_fails() {
    let (conn, _) = test_db_with_cards(&[]);
    let err = db::get_flashcards_due_for_review("Klingon", march(1), &conn).unwrap_err();
    assert!(matches!(err, CardError::DeckNotFound(_)));
}

#[test]
fn stats_fold_the_review_log() {
    let (mut conn, ids) = test_db_with_cards(&[("sí", "yes"), ("no", "no")]);
    db::submit_review(ids[0], q(5), Some(1000), march(1), &mut conn).unwrap();
    db::submit_review(ids[1], q(1), Some(2000), march(1), &mut conn).unwrap();
    db::submit_review(ids[1], q(3), Some(1500), march(2), &mut conn).unwrap();
    db::submit_review(ids[0], q(4), None, march(3), &mut conn).unwrap();

    let logs = db::get_review_logs(Some(DECK), &conn).unwrap();
    let stats = StudyStats::from_logs(&logs, march(3));
    assert_eq!(stats.total_reviews, 4);
    assert_eq!(stats.passed_reviews, 3);
    assert_eq!(stats.days_studied, 3);
    assert_eq!(stats.current_streak, 3);
    assert_eq!(stats.total_time_ms, 4500);

    assert_eq!(db::get_review_logs(None, &conn).unwrap().len(), 4);
    db::new_deck("Empty", &conn).unwrap();
    assert!(db::get_review_logs(Some("Empty"), &conn).unwrap().is_empty());
}
