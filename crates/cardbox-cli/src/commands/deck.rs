//! Deck management commands.

use std::path::PathBuf;

use cardbox_core::{leitner, Card, Config, DeckStore};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum DeckAction {
    /// Add a new card (box 1, reviewed today)
    Add {
        /// Question, word, or term to learn
        prompt: String,
        /// Expected answer
        answer: String,
        /// Card store to use instead of the configured one
        #[arg(long)]
        store: Option<PathBuf>,
        /// Review date to stamp (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List cards
    List {
        /// Only cards due on the reference date
        #[arg(long)]
        due: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Card store to use instead of the configured one
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Per-box counts and due summary as JSON
    Stats {
        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Card store to use instead of the configured one
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct DeckStats {
    total_cards: usize,
    cards_due: usize,
    /// Cards per box 1..=5; out-of-range boxes count as box 1, matching
    /// the interval fallback.
    per_box: [usize; 5],
}

fn open_store(
    config: &Config,
    store: Option<PathBuf>,
) -> Result<DeckStore, Box<dyn std::error::Error>> {
    match store {
        Some(path) => Ok(DeckStore::new(path, config.deck.date_precision)),
        None => Ok(DeckStore::from_config(config)?),
    }
}

fn reference(date: Option<NaiveDate>) -> NaiveDateTime {
    match date {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    }
}

pub fn run(action: DeckAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        DeckAction::Add {
            prompt,
            answer,
            store,
            date,
        } => {
            let store = open_store(&config, store)?;
            let card = Card::new(prompt, answer, 1, reference(date));
            store.append(&card)?;
            println!("Card added: {}", card.prompt);
        }
        DeckAction::List {
            due,
            json,
            date,
            store,
        } => {
            let store = open_store(&config, store)?;
            let reference = reference(date);
            let mut cards = store.load()?;
            if due {
                cards.retain(|card| leitner::is_due(card, reference));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else if cards.is_empty() {
                println!("No cards.");
            } else {
                for card in &cards {
                    println!(
                        "{}\t{}\tbox {}\tlast reviewed {}",
                        card.prompt,
                        card.answer,
                        card.box_number,
                        config.deck.date_precision.format(card.last_reviewed),
                    );
                }
            }
        }
        DeckAction::Stats { date, store } => {
            let store = open_store(&config, store)?;
            let reference = reference(date);
            let cards = store.load()?;

            let mut per_box = [0usize; 5];
            for card in &cards {
                let slot = match card.box_number {
                    1..=5 => card.box_number as usize - 1,
                    _ => 0,
                };
                per_box[slot] += 1;
            }
            let stats = DeckStats {
                total_cards: cards.len(),
                cards_due: cards
                    .iter()
                    .filter(|card| leitner::is_due(card, reference))
                    .count(),
                per_box,
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
