//! Review session engine.
//!
//! The session is a caller-driven state machine -- no stdin/stdout in here.
//! The driver presents `current_prompt()`, reads one line however it likes,
//! and feeds it to `submit()`; the engine grades the answer, applies the box
//! transition, and advances to the next due card.
//!
//! The reference date is captured once at construction and used for every
//! transition, so a session that spans real wall-clock time still behaves as
//! a single "today".

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;
use crate::leitner;

/// Input that ends a session early when the sentinel is enabled.
pub const STOP_SENTINEL: &str = "STOP";

/// Outcome of a single submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect {
        /// The expected answer, for echoing back to the user.
        expected: String,
    },
    /// Stop sentinel recognized: session over, current card untouched.
    Stopped,
}

/// Aggregated view of session progress, useful for end-of-run reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

/// One review run over the cards due on a fixed reference date.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    deck: Vec<Card>,
    /// Indices into `deck`, in collection order.
    due: Vec<usize>,
    cursor: usize,
    reference: NaiveDateTime,
    allow_stop: bool,
    stopped: bool,
}

impl ReviewSession {
    /// Select the due set for one run.
    ///
    /// The reference date is fixed here; every transition in the session
    /// uses it, however long the prompt loop takes.
    pub fn new(deck: Vec<Card>, reference: NaiveDateTime, allow_stop: bool) -> Self {
        let due: Vec<usize> = deck
            .iter()
            .enumerate()
            .filter(|(_, card)| leitner::is_due(card, reference))
            .map(|(i, _)| i)
            .collect();
        debug!(total = deck.len(), due = due.len(), %reference, "session selected");
        Self {
            deck,
            due,
            cursor: 0,
            reference,
            allow_stop,
            stopped: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn due_count(&self) -> usize {
        self.due.len()
    }

    pub fn reviewed_count(&self) -> usize {
        self.cursor
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Whether the stop sentinel is honored by `submit`.
    pub fn stop_enabled(&self) -> bool {
        self.allow_stop
    }

    /// True once every due card was answered or the session was stopped.
    pub fn is_finished(&self) -> bool {
        self.stopped || self.cursor >= self.due.len()
    }

    pub fn was_stopped(&self) -> bool {
        self.stopped
    }

    /// The card currently up for review.
    pub fn current(&self) -> Option<&Card> {
        if self.stopped {
            return None;
        }
        self.due.get(self.cursor).map(|&i| &self.deck[i])
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.current().map(|card| card.prompt.as_str())
    }

    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.due.len(),
            answered: self.cursor,
            remaining: self.due.len() - self.cursor,
            is_complete: self.is_finished(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Grade one answer line for the current card.
    ///
    /// Returns `None` once the session is finished. A recognized stop
    /// sentinel ends the session without touching the current card; any
    /// other input (including an empty line from a closed stdin) is graded
    /// and the box transition applied.
    pub fn submit(&mut self, raw_input: &str) -> Option<Verdict> {
        if self.is_finished() {
            return None;
        }

        if self.allow_stop && raw_input.trim().to_uppercase() == STOP_SENTINEL {
            self.stopped = true;
            debug!(answered = self.cursor, "session stopped by sentinel");
            return Some(Verdict::Stopped);
        }

        let index = self.due[self.cursor];
        let correct = self.deck[index].matches_answer(raw_input);
        leitner::apply_outcome(&mut self.deck[index], correct, self.reference);
        self.cursor += 1;

        if correct {
            Some(Verdict::Correct)
        } else {
            Some(Verdict::Incorrect {
                expected: self.deck[index].answer.clone(),
            })
        }
    }

    /// Hand the (possibly updated) full deck back for persisting.
    ///
    /// This is always the complete collection, not just the reviewed
    /// subset, so it is safe to pass to a replace-policy save.
    pub fn into_deck(self) -> Vec<Card> {
        self.deck
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }
}
