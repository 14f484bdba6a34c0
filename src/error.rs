//! Error type shared by the card store, import/export and review boundary.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid quality rating {0}: expected an integer from 0 to 5")]
    InvalidQuality(i64),

    #[error("invalid rating '{0}': expected 0-5 or again/hard/good/easy")]
    InvalidRating(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("card {0} not found")]
    CardNotFound(i64),

    #[error("deck '{0}' not found")]
    DeckNotFound(String),

    #[error("deck '{0}' already exists")]
    DeckExists(String),

    #[error("review state of card {0} was changed by another session")]
    Conflict(i64),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CardError>;
