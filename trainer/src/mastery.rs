//! Mastery score update after a rated review.
//!
//! Mastery is a percentage. Each rating has a base step; wrong moves, ignored
//! wrong moves and hints subtract a capped penalty from it. A clean `good` or
//! `easy` never loses mastery and an `again` never gains any.

use crate::rating::ReviewRating;

pub const MAX_MASTERY: u8 = 100;

const WRONG_MOVE_PENALTY: i32 = 4;
const IGNORED_WRONG_MOVE_PENALTY: i32 = 1;
const HINT_PENALTY: i32 = 2;
const MAX_PENALTY: i32 = 20;

fn base_step(rating: ReviewRating) -> i32 {
    match rating {
        ReviewRating::Again => -20,
        ReviewRating::Hard => -5,
        ReviewRating::Good => 10,
        ReviewRating::Easy => 15,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryInput {
    /// `None` for a variant that has never been reviewed.
    pub previous_mastery: Option<u8>,
    pub rating: ReviewRating,
    pub wrong_moves: u32,
    pub ignored_wrong_moves: u32,
    pub hints_used: u32,
}

pub fn compute_next_mastery(input: &MasteryInput) -> u8 {
    let previous = i32::from(input.previous_mastery.unwrap_or(0).min(MAX_MASTERY));

    let penalty = (input.wrong_moves.min(100) as i32 * WRONG_MOVE_PENALTY
        + input.ignored_wrong_moves.min(100) as i32 * IGNORED_WRONG_MOVE_PENALTY
        + input.hints_used.min(100) as i32 * HINT_PENALTY)
        .min(MAX_PENALTY);

    let mut delta = base_step(input.rating) - penalty;
    let clean_pass = input.wrong_moves == 0
        && matches!(input.rating, ReviewRating::Good | ReviewRating::Easy);
    if clean_pass {
        delta = delta.max(0);
    }

    (previous + delta).clamp(0, i32::from(MAX_MASTERY)) as u8
}
