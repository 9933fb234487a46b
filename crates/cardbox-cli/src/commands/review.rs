//! The interactive review session command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use cardbox_core::{Config, DeckStore, ReviewSession, Verdict};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;

#[derive(Args)]
pub struct ReviewArgs {
    /// Simulated "today" (YYYY-MM-DD); defaults to the system clock
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Card store to use instead of the configured one
    #[arg(long)]
    store: Option<PathBuf>,
    /// Keep looping until a pass finds no due cards
    #[arg(long, conflicts_with = "once")]
    repeat: bool,
    /// Single pass even if the config enables repeat mode
    #[arg(long)]
    once: bool,
}

pub fn run(args: ReviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = match args.store {
        Some(path) => DeckStore::new(path, config.deck.date_precision),
        None => DeckStore::from_config(&config)?,
    };

    // One reference date per run: every card reviewed in this process
    // shares the same "today", however long the prompts take.
    let reference: NaiveDateTime = match args.date {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    };

    let repeat = if args.once {
        false
    } else {
        args.repeat || config.review.repeat_until_empty
    };
    let allow_stop = config.review.allow_stop_sentinel;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("Loading flashcards...");
        let deck = store.load()?;
        let mut session = ReviewSession::new(deck, reference, allow_stop);

        if session.due_count() == 0 {
            println!("No cards to review today.");
            return Ok(());
        }

        println!("\n--- Reviewing today's cards ---");
        drive_session(&mut session, &mut input, allow_stop)?;

        let progress = session.progress();
        let stopped = session.was_stopped();

        println!("Saving progress...");
        store.save(&session.into_deck(), config.deck.save_policy)?;
        println!(
            "Reviewed {} of {} cards due. All done for today!",
            progress.answered, progress.total
        );

        if stopped || !repeat {
            return Ok(());
        }
    }
}

/// Prompt/read/grade until the session finishes or is stopped.
fn drive_session(
    session: &mut ReviewSession,
    input: &mut impl BufRead,
    allow_stop: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Some(prompt) = session.current_prompt().map(str::to_owned) {
        println!("Question: {prompt}");
        if allow_stop {
            print!("Your answer (type STOP to exit): ");
        } else {
            print!("Your answer: ");
        }
        std::io::stdout().flush()?;

        // EOF or a failed read scores as an empty answer.
        let mut line = String::new();
        if input.read_line(&mut line).is_err() {
            line.clear();
        }

        match session.submit(&line) {
            Some(Verdict::Correct) => println!("Correct!"),
            Some(Verdict::Incorrect { expected }) => {
                println!("Incorrect! The correct answer was: {expected}");
            }
            Some(Verdict::Stopped) => {
                println!("Stopping early. The current card is left unchanged.");
                return Ok(());
            }
            None => break,
        }
    }
    Ok(())
}
