//! Orchestration over a [`ReviewBackend`]: picks variants, starts sessions,
//! submits rated reviews and reports mistakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::backend::{PathLesson, ReviewBackend};
use crate::board::{PositionErrorReport, TrainingBoard};
use crate::error::{TrainerError, TrainerResult};
use crate::plan::{today_plan_progress, TodayPlanProgress};
use crate::rating::ReviewRating;
use crate::review::{PendingVariantReview, VariantReviewSubmission};
use crate::selector;
use crate::session::TrainingSession;
use crate::tree::Repertoire;
use crate::variant::{TrainVariant, TrainVariantInfo, Variant};

type InfoMap = HashMap<String, TrainVariantInfo>;

pub struct TrainingService<B: ReviewBackend> {
    backend: Arc<B>,
    /// Review history per repertoire, keyed by variant name.
    infos: Mutex<HashMap<String, InfoMap>>,
}

impl<B: ReviewBackend> TrainingService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            infos: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch a repertoire and enumerate its variants.
    pub async fn load_candidates(&self, repertoire_id: &str) -> TrainerResult<(Repertoire, Vec<Variant>)> {
        let repertoire = self.backend.get_repertoire(repertoire_id).await?;
        let variants = repertoire.variants();
        tracing::debug!(repertoire_id, variants = variants.len(), "Repertoire loaded");
        Ok((repertoire, variants))
    }

    /// Review history for a repertoire. A failed fetch counts as no history.
    pub async fn variant_infos(&self, repertoire_id: &str) -> InfoMap {
        match self.backend.get_variants_info(repertoire_id).await {
            Ok(list) => {
                let map: InfoMap = list
                    .into_iter()
                    .map(|info| (info.variant_name.clone(), info))
                    .collect();
                self.cache().insert(repertoire_id.to_string(), map.clone());
                map
            }
            Err(e) => {
                tracing::warn!(repertoire_id, error = %e, "Failed to fetch variant history, treating all as new");
                InfoMap::new()
            }
        }
    }

    pub async fn select_variants<R: Rng + ?Sized>(
        &self,
        count: usize,
        repertoire_id: &str,
        candidates: &[Variant],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<TrainVariant> {
        let infos = self.variant_infos(repertoire_id).await;
        selector::select_variants(count, candidates, &infos, now, rng)
    }

    /// Load a repertoire, pick up to `count` variants and set up the board.
    pub async fn start_session<R: Rng + ?Sized>(
        &self,
        repertoire_id: &str,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> TrainerResult<TrainingBoard> {
        let (repertoire, candidates) = self.load_candidates(repertoire_id).await?;
        if candidates.is_empty() {
            return Err(TrainerError::NothingToTrain(repertoire_id.to_string()));
        }

        let selected = self
            .select_variants(count, &repertoire.id, &candidates, now, rng)
            .await;
        if selected.is_empty() {
            return Err(TrainerError::NothingToTrain(repertoire_id.to_string()));
        }

        let session = TrainingSession::new(
            repertoire.id.clone(),
            repertoire.orientation,
            repertoire.start_fen(),
            selected,
        )?;
        Ok(TrainingBoard::new(session)?)
    }

    /// Rate a finished variant and store the review.
    pub async fn submit_review(
        &self,
        repertoire_id: &str,
        review: PendingVariantReview,
        rating: ReviewRating,
        now: DateTime<Utc>,
    ) -> TrainerResult<VariantReviewSubmission> {
        let previous_mastery = self
            .cache()
            .get(repertoire_id)
            .and_then(|infos| infos.get(&review.variant_name))
            .and_then(|info| info.mastery);

        let submission = review.into_submission(repertoire_id, rating, previous_mastery);
        if let Err(e) = self.backend.submit_variant_review(&submission).await {
            tracing::warn!(
                repertoire_id,
                variant = %submission.variant_name,
                error = %e,
                "Failed to submit review"
            );
            return Err(e.into());
        }

        tracing::info!(
            repertoire_id,
            variant = %submission.variant_name,
            rating = %submission.rating,
            mastery = submission.mastery,
            "Review submitted"
        );
        self.cache()
            .entry(repertoire_id.to_string())
            .or_default()
            .insert(
                submission.variant_name.clone(),
                TrainVariantInfo {
                    repertoire_id: repertoire_id.to_string(),
                    variant_name: submission.variant_name.clone(),
                    errors: submission.errors,
                    last_date: now,
                    mastery: Some(submission.mastery),
                },
            );
        Ok(submission)
    }

    pub async fn report_wrong_move(&self, report: &PositionErrorReport) -> TrainerResult<()> {
        self.backend.record_position_error(report).await.map_err(|e| {
            tracing::warn!(fen = %report.fen, error = %e, "Failed to record position error");
            TrainerError::from(e)
        })
    }

    /// Today's progress. A failed plan fetch shows as still loading.
    pub async fn today_progress(&self) -> TodayPlanProgress {
        match self.backend.get_plan().await {
            Ok(plan) => today_plan_progress(Some(&plan)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch today plan");
                today_plan_progress(None)
            }
        }
    }

    pub async fn next_lesson(&self) -> TrainerResult<PathLesson> {
        Ok(self.backend.get_path().await?)
    }

    /// Remove a variant from the study path.
    pub async fn forget_variant(&self, repertoire_id: &str, variant_name: &str) -> TrainerResult<()> {
        self.backend
            .delete_variant_info(repertoire_id, variant_name)
            .await?;
        if let Some(infos) = self.cache().get_mut(repertoire_id) {
            infos.remove(variant_name);
        }
        tracing::info!(repertoire_id, variant = variant_name, "Variant removed from path");
        Ok(())
    }

    pub async fn analytics(&self) -> TrainerResult<serde_json::Value> {
        Ok(self.backend.get_analytics().await?)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, InfoMap>> {
        self.infos.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
