//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an ease factor (EF) that adjusts based on performance
//! - Quality grades 0-2: Reset interval to 1 day and repetitions to 0
//! - Quality grades 3-5: Increase interval progressively (1 day → 6 days → EF multiplier)
//! - EF is recomputed after every review, failures included, and never falls below 1.3
//!
//! Intervals are rounded half away from zero (`f64::round`).

use super::quality::{Quality, Rating};
use super::review_state::{MIN_EASE_FACTOR, ReviewState};
use chrono::{DateTime, Days, NaiveDate, TimeZone};

/// Calculates the card state after one review graded `quality` on `today`.
pub fn calculate_next_review(state: &ReviewState, quality: Quality, today: NaiveDate) -> ReviewState {
    let (interval, repetitions) = if !quality.is_pass() {
        (1, 0)
    } else {
        let repetitions = state.repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            // Uses the ease factor the card had before this review
            _ => (f64::from(state.interval) * state.ease_factor).round() as u32,
        };
        (interval.max(1), repetitions)
    };

    let ease_factor = next_ease_factor(state.ease_factor, quality);

    ReviewState {
        interval,
        repetitions,
        ease_factor,
        due_date: Some(add_days(today, interval)),
    }
}

/// SM-2 ease update, applied on every review.
fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = 5.0 - f64::from(quality.value());
    let ef = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ef.max(MIN_EASE_FACTOR)
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Interval the card would get if graded `quality` now. Does not touch `state`.
pub fn preview_interval(state: &ReviewState, quality: Quality, today: NaiveDate) -> u32 {
    calculate_next_review(state, quality, today).interval
}

/// Next interval for each answer button, in button order.
pub fn preview_ratings(state: &ReviewState, today: NaiveDate) -> [(Rating, u32); 4] {
    Rating::ALL.map(|rating| (rating, preview_interval(state, rating.quality(), today)))
}

/// A card with no due date is always due; otherwise it is due on or after its due date.
pub fn is_due(due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_date.is_none_or(|due| due <= today)
}

/// Timestamp variant of [`is_due`]. Both sides are reduced to their calendar
/// date in the time zone of `now`, so time of day never matters.
pub fn is_due_at<Tz: TimeZone>(due: Option<DateTime<Tz>>, now: &DateTime<Tz>) -> bool {
    let tz = now.timezone();
    is_due(
        due.map(|d| d.with_timezone(&tz).date_naive()),
        now.date_naive(),
    )
}

/// Coarse label for a day count, e.g. "6 days" or "~2 months".
pub fn humanize_interval(days: u32) -> String {
    let rounded = |unit: u32| (f64::from(days) / f64::from(unit)).round() as u32;
    match days {
        1 => "1 day".to_string(),
        7 => "1 week".to_string(),
        0..=6 => format!("{days} days"),
        8..=29 => format!("~{} weeks", rounded(7)),
        30..=364 => format!("~{} months", rounded(30)),
        _ => format!("~{} years", rounded(365)),
    }
}
