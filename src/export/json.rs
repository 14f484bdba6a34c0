//! JSON import/export module for flashcard decks.
//! Saves and loads Deck structures, review state included, to/from JSON files.

use crate::error::Result;
use crate::models::{Deck, DeckSet};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Exports a deck to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    info!(deck = %deck.name, path = %path.display(), cards = deck.flashcards.len(), "deck exported");
    Ok(())
}

/// Exports every deck of `set` into `dir`, one `<deck name>.json` file each.
/// Characters that are unsafe in file names become `_`; clashing names get a
/// numeric suffix. Returns the written paths in deck order.
pub fn export_all_to_dir(set: &DeckSet, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(set.decks.len());
    for deck in &set.decks {
        let stem = file_stem(&deck.name);
        let mut candidate = stem.clone();
        let mut n = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{stem}-{n}");
            n += 1;
        }
        let path = dir.join(format!("{candidate}.json"));
        export_json_to_path(deck, &path)?;
        written.push(path);
    }

    info!(dir = %dir.display(), decks = set.decks.len(), cards = set.total_cards(), "all decks exported");
    Ok(written)
}

fn file_stem(deck_name: &str) -> String {
    let stem: String = deck_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "deck".to_string() } else { stem }
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: impl AsRef<Path>) -> Result<Deck> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;

    info!(deck = %deck.name, path = %path.display(), "deck read");
    Ok(deck)
}
