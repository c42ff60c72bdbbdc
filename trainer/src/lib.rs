//! Opening repertoire training core.
//!
//! Everything here is synchronous and deterministic apart from the injected
//! random source used by the selector and the simulated opponent. The only
//! asynchronous code is [`service::TrainingService`], which talks to the
//! backend through the [`backend::ReviewBackend`] trait.

pub mod backend;
pub mod board;
pub mod error;
pub mod mastery;
pub mod plan;
pub mod rating;
pub mod review;
pub mod selector;
pub mod service;
pub mod session;
pub mod tree;
pub mod variant;

pub use backend::{BackendError, PathLesson, ReviewBackend};
pub use board::{MoveOutcome, PositionErrorReport, StagedWrongMove, TrainingBoard, WrongMoveDecision};
pub use error::TrainerError;
pub use mastery::{compute_next_mastery, MasteryInput};
pub use plan::{today_plan_progress, ForecastDay, PathPlanSummary, TodayPlanProgress};
pub use rating::{suggest_review_rating, ReviewRating};
pub use review::{PendingVariantReview, ReviewQueue, VariantReviewSubmission};
pub use selector::select_variants;
pub use service::TrainingService;
pub use session::{SessionError, SessionSnapshot, TrainingSession, VariantStatus};
pub use tree::{MoveTreeNode, Repertoire};
pub use variant::{opening_name, MoveNode, TrainVariant, TrainVariantInfo, TrainVariantState, Variant};
