//! Leitner box scheduling rules.
//!
//! Pure functions only -- the caller supplies the reference date, so every
//! decision is reproducible in tests with a simulated "today". All cards in
//! one session should share a single reference date captured at session
//! start.

use chrono::NaiveDateTime;

use crate::card::Card;

/// Days to wait before a card in the given box comes up for review again.
///
/// Boxes outside 1..=5 fall back to daily review; this is a total function,
/// never an error.
pub fn interval_days(box_number: u32) -> i64 {
    match box_number {
        1 => 1,  // every day
        2 => 2,  // every other day
        3 => 4,
        4 => 7,  // weekly
        5 => 14, // every two weeks
        _ => 1,
    }
}

/// Whether a card should be presented, given the run's reference date.
///
/// Elapsed time counts whole days (delta in hours divided by 24). A
/// last-review date in the future never comes due.
pub fn is_due(card: &Card, reference: NaiveDateTime) -> bool {
    let elapsed_days = reference
        .signed_duration_since(card.last_reviewed)
        .num_hours()
        / 24;
    elapsed_days >= interval_days(card.box_number)
}

/// Apply a review outcome to a card's scheduling state.
///
/// Correct answers promote to the next box, capped at box 5; incorrect
/// answers demote to box 1 from anywhere. The review date is stamped either
/// way. No other fields change.
pub fn apply_outcome(card: &mut Card, correct: bool, reference: NaiveDateTime) {
    if correct {
        if card.box_number < 5 {
            card.box_number += 1;
        }
    } else {
        card.box_number = 1;
    }
    card.last_reviewed = reference;
}
