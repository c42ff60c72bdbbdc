//! Mock backend for testing

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use trainer::{
    BackendError, PathLesson, PathPlanSummary, PositionErrorReport, Repertoire, ReviewBackend, TrainVariantInfo,
    VariantReviewSubmission,
};

use crate::error::{ClientError, ClientResult};

type Responder<T> = Option<Box<dyn Fn() -> ClientResult<T> + Send>>;

/// Mock backend - only compiled in test mode or with the mock feature.
/// Unconfigured reads fail with [`ClientError::NotConfigured`]; writes succeed.
pub struct MockRepertoireBackend {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Default)]
struct MockResponses {
    get_repertoire: Responder<Repertoire>,
    get_variants_info: Responder<Vec<TrainVariantInfo>>,
    submit_variant_review: Responder<()>,
    record_position_error: Responder<()>,
    get_path: Responder<PathLesson>,
    get_plan: Responder<PathPlanSummary>,
    get_analytics: Responder<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    GetRepertoire { repertoire_id: String },
    GetVariantsInfo { repertoire_id: String },
    SubmitVariantReview(VariantReviewSubmission),
    DeleteVariantInfo { repertoire_id: String, variant_name: String },
    RecordPositionError(PositionErrorReport),
    GetPath,
    GetPlan,
    GetAnalytics,
}

impl Default for MockRepertoireBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fixed<T: Clone + Send + 'static>(value: T) -> Responder<T> {
    Some(Box::new(move || -> ClientResult<T> { Ok(value.clone()) }))
}

impl MockRepertoireBackend {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `repertoire` for any id
    pub fn with_repertoire(self, repertoire: Repertoire) -> Self {
        lock(&self.responses).get_repertoire = fixed(repertoire);
        self
    }

    pub fn with_variants_info(self, infos: Vec<TrainVariantInfo>) -> Self {
        lock(&self.responses).get_variants_info = fixed(infos);
        self
    }

    /// Configure get_variants_info response
    pub fn with_variants_info_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<Vec<TrainVariantInfo>> + Send + 'static,
    {
        lock(&self.responses).get_variants_info = Some(Box::new(f));
        self
    }

    /// Configure submit_variant_review response
    pub fn with_submit_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<()> + Send + 'static,
    {
        lock(&self.responses).submit_variant_review = Some(Box::new(f));
        self
    }

    /// Configure record_position_error response
    pub fn with_position_error_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<()> + Send + 'static,
    {
        lock(&self.responses).record_position_error = Some(Box::new(f));
        self
    }

    pub fn with_path(self, lesson: PathLesson) -> Self {
        lock(&self.responses).get_path = fixed(lesson);
        self
    }

    pub fn with_plan(self, plan: PathPlanSummary) -> Self {
        lock(&self.responses).get_plan = fixed(plan);
        self
    }

    pub fn with_analytics(self, analytics: serde_json::Value) -> Self {
        lock(&self.responses).get_analytics = fixed(analytics);
        self
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.call_log).clone()
    }

    /// Reviews submitted so far, in order
    pub fn submitted_reviews(&self) -> Vec<VariantReviewSubmission> {
        lock(&self.call_log)
            .iter()
            .filter_map(|call| match call {
                MockCall::SubmitVariantReview(review) => Some(review.clone()),
                _ => None,
            })
            .collect()
    }

    /// Position errors recorded so far, in order
    pub fn recorded_errors(&self) -> Vec<PositionErrorReport> {
        lock(&self.call_log)
            .iter()
            .filter_map(|call| match call {
                MockCall::RecordPositionError(report) => Some(report.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }

    fn record(&self, call: MockCall) {
        lock(&self.call_log).push(call);
    }

    fn respond<T>(&self, name: &str, pick: impl FnOnce(&MockResponses) -> &Responder<T>) -> ClientResult<T> {
        let responses = lock(&self.responses);
        match pick(&*responses) {
            Some(f) => f(),
            None => Err(ClientError::NotConfigured(name.to_string())),
        }
    }

    fn respond_or_ok(&self, pick: impl FnOnce(&MockResponses) -> &Responder<()>) -> ClientResult<()> {
        let responses = lock(&self.responses);
        match pick(&*responses) {
            Some(f) => f(),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ReviewBackend for MockRepertoireBackend {
    async fn get_repertoire(&self, repertoire_id: &str) -> Result<Repertoire, BackendError> {
        self.record(MockCall::GetRepertoire {
            repertoire_id: repertoire_id.to_string(),
        });
        Ok(self.respond("get_repertoire", |r| &r.get_repertoire)?)
    }

    async fn get_variants_info(&self, repertoire_id: &str) -> Result<Vec<TrainVariantInfo>, BackendError> {
        self.record(MockCall::GetVariantsInfo {
            repertoire_id: repertoire_id.to_string(),
        });
        Ok(self.respond("get_variants_info", |r| &r.get_variants_info)?)
    }

    async fn submit_variant_review(&self, review: &VariantReviewSubmission) -> Result<(), BackendError> {
        self.record(MockCall::SubmitVariantReview(review.clone()));
        Ok(self.respond_or_ok(|r| &r.submit_variant_review)?)
    }

    async fn delete_variant_info(&self, repertoire_id: &str, variant_name: &str) -> Result<(), BackendError> {
        self.record(MockCall::DeleteVariantInfo {
            repertoire_id: repertoire_id.to_string(),
            variant_name: variant_name.to_string(),
        });
        Ok(())
    }

    async fn record_position_error(&self, report: &PositionErrorReport) -> Result<(), BackendError> {
        self.record(MockCall::RecordPositionError(report.clone()));
        Ok(self.respond_or_ok(|r| &r.record_position_error)?)
    }

    async fn get_path(&self) -> Result<PathLesson, BackendError> {
        self.record(MockCall::GetPath);
        Ok(self.respond("get_path", |r| &r.get_path)?)
    }

    async fn get_plan(&self) -> Result<PathPlanSummary, BackendError> {
        self.record(MockCall::GetPlan);
        Ok(self.respond("get_plan", |r| &r.get_plan)?)
    }

    async fn get_analytics(&self) -> Result<serde_json::Value, BackendError> {
        self.record(MockCall::GetAnalytics);
        Ok(self.respond("get_analytics", |r| &r.get_analytics)?)
    }
}
