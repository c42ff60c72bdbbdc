//! Spaced-repetition variant selection.
//!
//! Variants never reviewed are "new". Reviewed variants are due once enough
//! days have passed relative to how error-prone they are, and the most
//! overdue come first. A share of each batch is reserved for new variants
//! and any gap is backfilled from what is left.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::variant::{TrainVariant, TrainVariantInfo, Variant};

/// Share of a batch reserved for variants with no review history.
pub const NEW_VARIANT_RATIO: f64 = 0.3;

const MIN_DAYS_BETWEEN_REVIEWS: f64 = 1.0;
const BASE_INTERVAL_DAYS: f64 = 3.0;
const DIFFICULTY_PER_ERROR: f64 = 0.5;
const DUE_FACTOR: f64 = 0.75;
const DUE_JITTER: f64 = 0.15;
const SCORE_JITTER: f64 = 0.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Choose up to `count` variants to drill next.
///
/// `infos` is keyed by variant full name. Reviewed variants come first, most
/// overdue first, followed by new ones in candidate order.
pub fn select_variants<R: Rng + ?Sized>(
    count: usize,
    candidates: &[Variant],
    infos: &HashMap<String, TrainVariantInfo>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<TrainVariant> {
    let mut new_variants: Vec<&Variant> = Vec::new();
    let mut reviewed: Vec<(f64, &Variant)> = Vec::new();

    for variant in candidates {
        let Some(info) = infos.get(&variant.full_name) else {
            new_variants.push(variant);
            continue;
        };

        let days_since = (now - info.last_date).num_milliseconds() as f64 / MILLIS_PER_DAY;
        if days_since < MIN_DAYS_BETWEEN_REVIEWS {
            continue;
        }

        let difficulty = 1.0 + f64::from(info.errors) * DIFFICULTY_PER_ERROR;
        let expected_interval = BASE_INTERVAL_DAYS * difficulty;
        let due_after = expected_interval * (DUE_FACTOR + rng.gen::<f64>() * DUE_JITTER);
        if days_since < due_after {
            continue;
        }

        let score = days_since / expected_interval + rng.gen::<f64>() * SCORE_JITTER;
        reviewed.push((score, variant));
    }

    reviewed.sort_by(|a, b| b.0.total_cmp(&a.0));

    let new_count = (count as f64 * NEW_VARIANT_RATIO).round() as usize;
    let reviewed_count = count - new_count.min(count);

    let mut reviewed = reviewed.into_iter().map(|(_, v)| v);
    let mut new_variants = new_variants.into_iter();

    let mut picked: Vec<&Variant> = reviewed.by_ref().take(reviewed_count).collect();
    picked.extend(new_variants.by_ref().take(new_count));

    let missing = count.saturating_sub(picked.len());
    picked.extend(reviewed.chain(new_variants).take(missing));

    tracing::debug!(
        requested = count,
        candidates = candidates.len(),
        selected = picked.len(),
        "Variants selected"
    );

    picked
        .into_iter()
        .map(|v| TrainVariant::new(v.clone(), now))
        .collect()
}
