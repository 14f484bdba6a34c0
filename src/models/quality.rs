//! Recall quality ratings.
//!
//! A [`Quality`] is the 0-5 self assessment the SM-2 scheduler consumes. It can
//! only be built through [`Quality::new`], so the scheduler never sees an out
//! of range value. [`Rating`] is the four-button face of the same scale.

use crate::error::{CardError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;
    /// Lowest quality that counts as a successful recall.
    pub const PASS: u8 = 3;

    pub fn new(value: i64) -> Result<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CardError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= Self::PASS
    }

    pub fn rating(self) -> Rating {
        match self.0 {
            0 | 1 => Rating::Again,
            2 => Rating::Hard,
            3 => Rating::Good,
            _ => Rating::Easy,
        }
    }

    pub fn label(self) -> &'static str {
        self.rating().as_str()
    }
}

impl TryFrom<i64> for Quality {
    type Error = CardError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Accepts a digit `0`-`5` or a button name such as `good`.
impl FromStr for Quality {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) => Self::new(n),
            Err(_) => s.parse::<Rating>().map(Rating::quality),
        }
    }
}

/// Answer buttons shown during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Quality submitted when this button is pressed.
    pub fn quality(self) -> Quality {
        match self {
            Rating::Again => Quality(0),
            Rating::Hard => Quality(2),
            Rating::Good => Quality(3),
            Rating::Easy => Quality(5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(CardError::InvalidRating(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_to_five() {
        for q in 0..=5 {
            assert_eq!(Quality::new(q).unwrap().value() as i64, q);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(Quality::new(-1), Err(CardError::InvalidQuality(-1))));
        assert!(matches!(Quality::new(6), Err(CardError::InvalidQuality(6))));
    }

    #[test]
    fn labels_follow_the_button_bands() {
        let labels: Vec<_> = (0..=5).map(|q| Quality::new(q).unwrap().label()).collect();
        assert_eq!(labels, ["Again", "Again", "Hard", "Good", "Easy", "Easy"]);
    }

    #[test]
    fn hard_is_not_a_pass() {
        assert!(!Rating::Hard.quality().is_pass());
        assert!(Rating::Good.quality().is_pass());
    }

    #[test]
    fn parses_digits_and_names() {
        assert_eq!("4".parse::<Quality>().unwrap().value(), 4);
        assert_eq!("Easy".parse::<Quality>().unwrap(), Rating::Easy.quality());
        assert!("7".parse::<Quality>().is_err());
        assert!("meh".parse::<Quality>().is_err());
    }
}
