//! Study statistics folded from review logs and card states.

use super::{Card, ReviewLog, sm2};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudyStats {
    pub total_reviews: usize,
    pub passed_reviews: usize,
    /// Share of reviews graded 3 or higher; 0 when nothing was reviewed.
    pub retention: f64,
    pub days_studied: usize,
    pub total_time_ms: u64,
    /// Consecutive study days ending today, or ending yesterday while today
    /// has no reviews yet.
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_studied: Option<NaiveDate>,
}

impl StudyStats {
    pub fn from_logs(logs: &[ReviewLog], today: NaiveDate) -> Self {
        let total_reviews = logs.len();
        let passed_reviews = logs.iter().filter(|log| log.quality >= 3).count();
        let retention = if total_reviews == 0 {
            0.0
        } else {
            passed_reviews as f64 / total_reviews as f64
        };

        let days: BTreeSet<NaiveDate> = logs
            .iter()
            .map(|log| log.date)
            .filter(|date| *date <= today)
            .collect();

        Self {
            total_reviews,
            passed_reviews,
            retention,
            days_studied: days.len(),
            total_time_ms: logs.iter().filter_map(|log| log.time_spent_ms).sum(),
            current_streak: current_streak(&days, today),
            longest_streak: longest_streak(&days),
            last_studied: days.last().copied(),
        }
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Card counts for one deck on a given day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeckOverview {
    pub total: usize,
    /// Cards with no successful review since creation or their last lapse.
    pub new: usize,
    /// Cards due today, new ones included.
    pub due: usize,
}

impl DeckOverview {
    pub fn from_cards(cards: &[Card], today: NaiveDate) -> Self {
        Self {
            total: cards.len(),
            new: cards
                .iter()
                .filter(|card| card.review.is_new())
                .count(),
            due: cards
                .iter()
                .filter(|card| sm2::is_due(card.review.due_date, today))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewState;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn log(d: u32, quality: u8, ms: Option<u64>) -> ReviewLog {
        ReviewLog {
            flashcard_id: 1,
            date: day(d),
            quality,
            time_spent_ms: ms,
        }
    }

    #[test]
    fn empty_history() {
        let stats = StudyStats::from_logs(&[], day(10));
        assert_eq!(stats, StudyStats::default());
    }

    #[test]
    fn totals_and_retention() {
        let logs = [log(1, 5, Some(1000)), log(1, 1, None), log(2, 3, Some(500)), log(2, 2, Some(250))];
        let stats = StudyStats::from_logs(&logs, day(2));
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.passed_reviews, 2);
        assert!((stats.retention - 0.5).abs() < 1e-12);
        assert_eq!(stats.days_studied, 2);
        assert_eq!(stats.total_time_ms, 1750);
        assert_eq!(stats.last_studied, Some(day(2)));
    }

    #[test]
    fn streak_counts_back_from_today() {
        let logs = [log(3, 4, None), log(4, 4, None), log(5, 4, None), log(1, 4, None)];
        let stats = StudyStats::from_logs(&logs, day(5));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn streak_survives_until_today_is_studied() {
        let logs = [log(3, 4, None), log(4, 4, None)];
        assert_eq!(StudyStats::from_logs(&logs, day(5)).current_streak, 2);
        assert_eq!(StudyStats::from_logs(&logs, day(6)).current_streak, 0);
    }

    #[test]
    fn longest_streak_is_independent_of_today() {
        let logs = [
            log(1, 3, None),
            log(2, 3, None),
            log(3, 3, None),
            log(4, 3, None),
            log(8, 3, None),
            log(9, 3, None),
        ];
        let stats = StudyStats::from_logs(&logs, day(9));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn deck_overview_counts_new_and_due() {
        let card = |id: i64, review: ReviewState| Card {
            id,
            deck_name: "Spanish".into(),
            term: format!("t{id}"),
            definition: format!("d{id}"),
            review,
            version: 0,
        };
        let scheduled = |due: u32| ReviewState {
            interval: 1,
            repetitions: 1,
            ease_factor: 2.5,
            due_date: Some(day(due)),
        };
        let lapsed = ReviewState {
            interval: 1,
            repetitions: 0,
            ease_factor: 1.7,
            due_date: Some(day(12)),
        };
        let cards = [
            card(1, ReviewState::default()),
            card(2, scheduled(9)),
            card(3, scheduled(10)),
            card(4, scheduled(11)),
            card(5, lapsed),
        ];

        let overview = DeckOverview::from_cards(&cards, day(10));
        // the lapsed card is new again but not due until day 12
        assert_eq!(overview, DeckOverview { total: 5, new: 2, due: 3 });
    }
}
