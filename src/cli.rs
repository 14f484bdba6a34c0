//! Command line interface: deck management, reviews and interactive study.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use velum_cards::clock::{self, Clock, FixedClock, SystemClock};
use velum_cards::config::VelumConfig;
use velum_cards::database::db;
use velum_cards::export::json::{export_all_to_dir, export_json_to_path, import_json};
use velum_cards::models::sm2::{humanize_interval, preview_ratings};
use velum_cards::models::stats::{DeckOverview, StudyStats};
use velum_cards::{Card, CardError, Deck, Flashcard, LearningSession, Quality};

#[derive(Parser)]
#[command(name = "velum-cards", version, about = "Flashcards scheduled with the SM-2 algorithm")]
pub struct Cli {
    /// Config file to use instead of ~/.velum/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage decks
    Deck {
        #[command(subcommand)]
        action: DeckAction,
    },
    /// Manage cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },
    /// List the cards of a deck that are due for review
    Due { deck: String },
    /// Record one review of a card
    Review {
        card_id: i64,
        /// 0-5, or again/hard/good/easy
        #[arg(value_parser = parse_quality_arg)]
        quality: Quality,
        /// Time spent answering, in milliseconds
        #[arg(long)]
        time_ms: Option<u64>,
    },
    /// Show the next interval each answer would give a card
    Preview { card_id: i64 },
    /// Study the due cards of a deck
    Study {
        deck: String,
        /// Override the session size from the config (0 = no limit)
        #[arg(long)]
        max_cards: Option<usize>,
    },
    /// Show study statistics
    Stats {
        #[arg(long)]
        deck: Option<String>,
    },
    /// Export a deck, with review state, to a JSON file
    Export { deck: String, path: PathBuf },
    /// Import a deck from a JSON file
    Import { path: PathBuf },
    /// Export every deck into a directory, one JSON file per deck
    Backup { dir: PathBuf },
    /// Inspect or move the simulated study date
    Day {
        #[command(subcommand)]
        action: DayAction,
    },
    /// Create a small sample Spanish deck
    Seed,
}

#[derive(Subcommand)]
pub enum DeckAction {
    New { name: String },
    List,
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum CardAction {
    Add {
        deck: String,
        term: String,
        definition: String,
    },
    List { deck: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum DayAction {
    /// Print the date reviews are scheduled against
    Show,
    /// Move the simulated date one day forward
    Advance,
    /// Go back to the real calendar
    Reset,
}

const SAMPLE_DECK: &str = "Spanish Basics";
const SAMPLE_CARDS: [(&str, &str); 8] = [
    ("hola", "hello"),
    ("gracias", "thank you"),
    ("por favor", "please"),
    ("perro", "dog"),
    ("gato", "cat"),
    ("casa", "house"),
    ("agua", "water"),
    ("libro", "book"),
];

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    clock::parse_date(s).map_err(|e| e.to_string())
}

fn parse_quality_arg(s: &str) -> Result<Quality, String> {
    s.parse::<Quality>().map_err(|e| e.to_string())
}

/// `--today` wins, then the stored simulated date, then the system calendar.
fn resolve_clock(flag: Option<NaiveDate>, conn: &Connection) -> Result<Box<dyn Clock>> {
    let date = match flag {
        Some(date) => Some(date),
        None => db::get_simulated_date(conn)?,
    };
    Ok(match date {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    })
}

pub fn run(cli: Cli, config: &VelumConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let mut conn = db::open_database(&db_path)
        .with_context(|| format!("failed to open card database at {}", db_path.display()))?;
    let today = resolve_clock(cli.today, &conn)?.today();

    match cli.command {
        Command::Deck { action } => match action {
            DeckAction::New { name } => {
                db::new_deck(&name, &conn)?;
                println!("Deck '{name}' created.");
            }
            DeckAction::List => list_decks(today, &conn)?,
            DeckAction::Delete { name } => {
                db::delete_deck(&name, &conn)?;
                println!("Deck '{name}' deleted.");
            }
        },
        Command::Card { action } => match action {
            CardAction::Add { deck, term, definition } => {
                let id = db::add_flashcard(&deck, &term, &definition, &conn)?;
                println!("Card {id} in '{deck}': {term} → {definition}");
            }
            CardAction::List { deck } => print_cards(&db::get_cards_for_deck(&deck, &conn)?),
            CardAction::Delete { id } => {
                db::delete_flashcard(id, &conn)?;
                println!("Card {id} deleted.");
            }
        },
        Command::Due { deck } => {
            let due = db::get_flashcards_due_for_review(&deck, today, &conn)?;
            if due.is_empty() {
                println!("Nothing due in '{deck}' on {today}.");
            } else {
                println!("{} card(s) due in '{deck}' on {today}:", due.len());
                print_cards(&due);
            }
        }
        Command::Review { card_id, quality, time_ms } => {
            let card = db::submit_review(card_id, quality, time_ms, today, &mut conn)?;
            print_review_result(&card, quality);
        }
        Command::Preview { card_id } => {
            let card = db::get_card(card_id, &conn)?;
            println!("{} → {}", card.term, card.definition);
            for (rating, days) in preview_ratings(&card.review, today) {
                println!("  {:<6} {}", rating.as_str(), humanize_interval(days));
            }
        }
        Command::Study { deck, max_cards } => {
            let max_cards = max_cards.unwrap_or(config.session.max_cards);
            study(&deck, today, max_cards, &mut conn)?;
        }
        Command::Stats { deck } => print_stats(deck.as_deref(), today, &conn)?,
        Command::Export { deck, path } => {
            let deck = db::load_deck(&deck, &conn)?;
            export_json_to_path(&deck, &path)?;
            println!("Deck '{}' exported to {}", deck.name, path.display());
        }
        Command::Backup { dir } => {
            let set = db::load_all_decks(&conn)?;
            let paths = export_all_to_dir(&set, &dir)?;
            println!(
                "{} decks ({} cards) exported to {}",
                paths.len(),
                set.total_cards(),
                dir.display()
            );
        }
        Command::Import { path } => {
            let deck = import_json(&path)?;
            let count = db::import_deck(&deck, &mut conn)?;
            println!(
                "Deck '{}' imported from {} ({count} cards, {} new)",
                deck.name,
                path.display(),
                deck.new_count()
            );
        }
        Command::Day { action } => match action {
            DayAction::Show => println!("{today}"),
            DayAction::Advance => println!("Simulated date is now {}", db::advance_day(today, &conn)?),
            DayAction::Reset => {
                db::reset_simulated_date(&conn)?;
                println!("Using the real calendar ({}).", SystemClock.today());
            }
        },
        Command::Seed => seed(&mut conn)?,
    }

    Ok(())
}

fn list_decks(today: NaiveDate, conn: &Connection) -> Result<()> {
    let names = db::get_all_decks(conn)?;
    if names.is_empty() {
        println!("No decks yet. Try `velum-cards seed`.");
        return Ok(());
    }

    println!("{:<24} {:>6} {:>6} {:>6}", "Deck", "Cards", "New", "Due");
    for name in names {
        let overview = DeckOverview::from_cards(&db::get_cards_for_deck(&name, conn)?, today);
        println!(
            "{:<24} {:>6} {:>6} {:>6}",
            name, overview.total, overview.new, overview.due
        );
    }
    Ok(())
}

fn print_cards(cards: &[Card]) {
    for card in cards {
        let due = card
            .review
            .due_date
            .map_or_else(|| "new".to_string(), |date| date.to_string());
        println!(
            "  [{:>4}] {:<24} {:<24} due {:<10} reps {:>2} ef {:.2}",
            card.id, card.term, card.definition, due, card.review.repetitions, card.review.ease_factor
        );
    }
}

fn print_review_result(card: &Card, quality: Quality) {
    let due = card
        .review
        .due_date
        .map_or_else(|| "-".to_string(), |date| date.to_string());
    println!(
        "{} graded {}: next review in {} ({due}), ease {:.2}",
        card.term,
        quality,
        humanize_interval(card.review.interval),
        card.review.ease_factor
    );
}

fn print_stats(deck: Option<&str>, today: NaiveDate, conn: &Connection) -> Result<()> {
    let stats = StudyStats::from_logs(&db::get_review_logs(deck, conn)?, today);

    println!("Study Statistics{}", deck.map(|d| format!(" for '{d}'")).unwrap_or_default());
    println!("{}", "=".repeat(40));
    println!("  Reviews:             {}", stats.total_reviews);
    println!("  Passed:              {}", stats.passed_reviews);
    println!("  Retention:           {:.0}%", stats.retention * 100.0);
    println!("  Days studied:        {}", stats.days_studied);
    println!("  Current streak:      {} day(s)", stats.current_streak);
    println!("  Longest streak:      {} day(s)", stats.longest_streak);
    println!("  Time spent:          {} min", stats.total_time_ms / 60_000);
    if let Some(last) = stats.last_studied {
        println!("  Last studied:        {last}");
    }

    if let Some(name) = deck {
        let overview = DeckOverview::from_cards(&db::get_cards_for_deck(name, conn)?, today);
        println!();
        println!("  Cards:               {}", overview.total);
        println!("  New:                 {}", overview.new);
        println!("  Due today:           {}", overview.due);
    }
    Ok(())
}

fn prompt(message: &str) -> io::Result<()> {
    print!("{message} ");
    io::stdout().flush()
}

fn study(deck: &str, today: NaiveDate, max_cards: usize, conn: &mut Connection) -> Result<()> {
    let mut session = LearningSession::start(deck, today, max_cards, conn)?;
    if session.is_completed() {
        println!("No cards due in '{deck}' on {today}.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_completed() {
        let Some(card) = session.current_card() else {
            break;
        };
        let (term, definition) = (card.term.clone(), card.definition.clone());

        println!();
        println!(
            "{}  [{} learned, {} remaining]",
            session.phase_message(),
            session.learned_count(),
            session.remaining_count()
        );
        println!("  {term}");
        let shown_at = Instant::now();

        prompt("Enter to reveal (q to quit):")?;
        match lines.next().transpose()? {
            Some(line) if line.trim() != "q" => {}
            _ => break,
        }
        session.toggle_definition();
        println!("  → {definition}");

        if let Some(preview) = session.preview_current() {
            let buttons: Vec<String> = preview
                .iter()
                .map(|(rating, days)| format!("{rating}: {}", humanize_interval(*days)))
                .collect();
            println!("  {}", buttons.join(" | "));
        }

        let quality = loop {
            prompt("Grade 0-5 or again/hard/good/easy:")?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            match line.parse::<Quality>() {
                Ok(quality) => break quality,
                Err(err @ (CardError::InvalidQuality(_) | CardError::InvalidRating(_))) => println!("  {err}"),
                Err(err) => return Err(err.into()),
            }
        };

        let elapsed_ms = u64::try_from(shown_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        session.grade_current_card(quality, Some(elapsed_ms), conn)?;
        session.next_card();
    }

    if session.is_completed() {
        println!();
        println!("Session complete after {} round(s).", session.round_number);
    }
    Ok(())
}

fn seed(conn: &mut Connection) -> Result<()> {
    let deck = Deck::new(
        SAMPLE_DECK,
        SAMPLE_CARDS
            .iter()
            .map(|(term, definition)| Flashcard::new(*term, *definition))
            .collect(),
    );

    match db::import_deck(&deck, conn) {
        Ok(count) => println!("Sample deck '{SAMPLE_DECK}' created with {count} cards."),
        Err(CardError::DeckExists(_)) => println!("Sample deck '{SAMPLE_DECK}' already exists."),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
