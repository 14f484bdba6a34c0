use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ease factor given to a card that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
/// The ease factor never drops below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// SM-2 scheduling state attached to one flashcard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Days until the next review. 0 until the first review.
    pub interval: u32,
    /// Consecutive successful reviews since creation or the last failure.
    pub repetitions: u32,
    pub ease_factor: f64,
    /// `None` for a card that was never scheduled; such a card is always due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl ReviewState {
    /// A card is new until it passes a review, and again after each lapse.
    pub fn is_new(&self) -> bool {
        self.repetitions == 0
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            due_date: None,
        }
    }
}

/// One entry of a card's append-only review history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub flashcard_id: i64,
    pub date: NaiveDate,
    pub quality: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_a_new_unscheduled_card() {
        let state = ReviewState::default();
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert!(state.due_date.is_none());
        assert!(state.is_new());
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let state = ReviewState {
            interval: 6,
            repetitions: 2,
            ease_factor: 2.36,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 7),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["interval"], 6);
        assert_eq!(json["repetitions"], 2);
        assert_eq!(json["easeFactor"], 2.36);
        assert_eq!(json["dueDate"], "2024-05-07");
    }

    #[test]
    fn missing_due_date_deserializes_as_new() {
        let state: ReviewState =
            serde_json::from_str(r#"{"interval":0,"repetitions":0,"easeFactor":2.5}"#).unwrap();
        assert_eq!(state, ReviewState::default());
    }
}
