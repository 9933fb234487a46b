//! The flashcard data model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single learning item: a prompt, its expected answer, and the
/// scheduling state the Leitner rules operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Question, word, or term shown to the user. Also the store key.
    pub prompt: String,
    /// Expected response.
    pub answer: String,
    /// Leitner box (1 to 5). Out-of-range values are tolerated and
    /// scheduled as box 1.
    pub box_number: u32,
    /// When this card was last presented and scored.
    pub last_reviewed: NaiveDateTime,
}

impl Card {
    pub fn new(
        prompt: impl Into<String>,
        answer: impl Into<String>,
        box_number: u32,
        last_reviewed: NaiveDateTime,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            box_number,
            last_reviewed,
        }
    }

    /// Grade a raw answer against this card.
    ///
    /// Comparison is case-insensitive with surrounding whitespace trimmed
    /// on both sides; otherwise exact. No fuzzy matching.
    pub fn matches_answer(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}
