//! Backend trait abstraction.
//!
//! Implemented by the HTTP client and by in-memory doubles in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::PositionErrorReport;
use crate::plan::PathPlanSummary;
use crate::review::VariantReviewSubmission;
use crate::tree::Repertoire;
use crate::variant::TrainVariantInfo;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Backend returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Backend returned invalid data: {0}")]
    InvalidData(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// `GET /paths` response: the next thing the study path suggests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PathLesson {
    /// A reviewed variant that is due again.
    Variant {
        repertoire_id: String,
        repertoire_name: String,
        variant_name: String,
        #[serde(default)]
        errors: u32,
        #[serde(default)]
        last_date: Option<DateTime<Utc>>,
    },
    /// A variant never studied before.
    NewVariant {
        repertoire_id: String,
        repertoire_name: String,
        variant_name: String,
    },
    /// Nothing left for today.
    Empty,
}

impl PathLesson {
    pub fn repertoire_id(&self) -> Option<&str> {
        match self {
            Self::Variant { repertoire_id, .. } | Self::NewVariant { repertoire_id, .. } => {
                Some(repertoire_id)
            }
            Self::Empty => None,
        }
    }

    pub fn variant_name(&self) -> Option<&str> {
        match self {
            Self::Variant { variant_name, .. } | Self::NewVariant { variant_name, .. } => Some(variant_name),
            Self::Empty => None,
        }
    }
}

/// Persistence and study-path interface used by the trainer.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Fetch a repertoire with its move tree
    async fn get_repertoire(&self, repertoire_id: &str) -> Result<Repertoire, BackendError>;

    /// Review history of every variant of a repertoire
    async fn get_variants_info(&self, repertoire_id: &str) -> Result<Vec<TrainVariantInfo>, BackendError>;

    /// Store one rated review
    async fn submit_variant_review(&self, review: &VariantReviewSubmission) -> Result<(), BackendError>;

    /// Drop a variant's history so it leaves the study path
    async fn delete_variant_info(&self, repertoire_id: &str, variant_name: &str) -> Result<(), BackendError>;

    /// Record a counted wrong move
    async fn record_position_error(&self, report: &PositionErrorReport) -> Result<(), BackendError>;

    /// Next lesson on the study path
    async fn get_path(&self) -> Result<PathLesson, BackendError>;

    /// Today's plan summary
    async fn get_plan(&self) -> Result<PathPlanSummary, BackendError>;

    /// Study analytics, passed through as-is
    async fn get_analytics(&self) -> Result<serde_json::Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_lesson_wire_format() {
        let lesson: PathLesson = serde_json::from_str(
            r#"{"type":"newVariant","repertoireId":"r1","repertoireName":"e4 for White","variantName":"Ruy Lopez"}"#,
        )
        .unwrap();
        assert_eq!(lesson.repertoire_id(), Some("r1"));
        assert_eq!(lesson.variant_name(), Some("Ruy Lopez"));

        let due: PathLesson = serde_json::from_str(
            r#"{"type":"variant","repertoireId":"r1","repertoireName":"x","variantName":"Scotch Game","errors":2,"lastDate":"2026-10-10T08:00:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(due, PathLesson::Variant { errors: 2, .. }));

        let empty: PathLesson = serde_json::from_str(r#"{"type":"empty"}"#).unwrap();
        assert_eq!(empty, PathLesson::Empty);
        assert_eq!(empty.variant_name(), None);
    }
}
