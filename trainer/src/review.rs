use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::mastery::{compute_next_mastery, MasteryInput};
use crate::rating::ReviewRating;

/// A finished line waiting for the user to confirm its rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVariantReview {
    pub variant_name: String,
    pub opening_name: String,
    pub start_fen: String,
    pub wrong_moves: u32,
    pub ignored_wrong_moves: u32,
    pub hints_used: u32,
    pub time_spent_sec: u64,
    pub suggested_rating: ReviewRating,
}

impl PendingVariantReview {
    /// Build the backend record for this review under the confirmed `rating`.
    pub fn into_submission(
        self,
        repertoire_id: impl Into<String>,
        rating: ReviewRating,
        previous_mastery: Option<u8>,
    ) -> VariantReviewSubmission {
        let mastery = compute_next_mastery(&MasteryInput {
            previous_mastery,
            rating,
            wrong_moves: self.wrong_moves,
            ignored_wrong_moves: self.ignored_wrong_moves,
            hints_used: self.hints_used,
        });

        VariantReviewSubmission {
            repertoire_id: repertoire_id.into(),
            variant_name: self.variant_name,
            errors: self.wrong_moves,
            rating,
            wrong_moves: self.wrong_moves,
            ignored_wrong_moves: self.ignored_wrong_moves,
            hints_used: self.hints_used,
            time_spent_sec: self.time_spent_sec,
            mastery,
        }
    }
}

/// Body of `POST /repertoires/{id}/variantsInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantReviewSubmission {
    pub repertoire_id: String,
    pub variant_name: String,
    pub errors: u32,
    pub rating: ReviewRating,
    pub wrong_moves: u32,
    pub ignored_wrong_moves: u32,
    pub hints_used: u32,
    pub time_spent_sec: u64,
    pub mastery: u8,
}

/// FIFO of reviews waiting to be rated. Only the front one is shown.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    items: VecDeque<PendingVariantReview>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, review: PendingVariantReview) {
        self.items.push_back(review);
    }

    /// The review currently being rated.
    pub fn current(&self) -> Option<&PendingVariantReview> {
        self.items.front()
    }

    pub fn pop(&mut self) -> Option<PendingVariantReview> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingVariantReview> {
        self.items.iter()
    }
}
