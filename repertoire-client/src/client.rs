//! reqwest implementation of the backend API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use trainer::{
    BackendError, PathLesson, PathPlanSummary, PositionErrorReport, Repertoire, ReviewBackend, TrainVariantInfo,
    VariantReviewSubmission,
};

use crate::error::{ClientError, ClientResult};

/// Network client for the repertoire backend.
///
/// Cheap to clone; the inner [`reqwest::Client`] is reference counted.
#[derive(Debug, Clone)]
pub struct RepertoireClient {
    client: Client,
    base_url: String,
}

impl RepertoireClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidAddress(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send and fail on any non-2xx status.
    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> ClientResult<Response> {
        tracing::debug!(%method, path, "Backend request");
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        tracing::warn!(%method, path, status = status.as_u16(), "Backend request failed");
        Err(ClientError::Status {
            method: method.to_string(),
            path: path.to_string(),
            code: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self.send(Method::GET, path, self.request(Method::GET, path)).await?;
        Ok(resp.json().await?)
    }

    /// `GET /repertoires/{id}`
    pub async fn repertoire(&self, repertoire_id: &str) -> ClientResult<Repertoire> {
        self.get_json(&format!("/repertoires/{repertoire_id}")).await
    }

    /// `GET /repertoires/{id}/variantsInfo`
    pub async fn variants_info(&self, repertoire_id: &str) -> ClientResult<Vec<TrainVariantInfo>> {
        self.get_json(&format!("/repertoires/{repertoire_id}/variantsInfo"))
            .await
    }

    /// `POST /repertoires/{id}/variantsInfo`
    pub async fn post_variant_review(&self, review: &VariantReviewSubmission) -> ClientResult<()> {
        let path = format!("/repertoires/{}/variantsInfo", review.repertoire_id);
        let req = self.request(Method::POST, &path).json(review);
        self.send(Method::POST, &path, req).await?;
        Ok(())
    }

    /// `DELETE /repertoires/{id}/variantsInfo?variantName=...`
    pub async fn delete_variant(&self, repertoire_id: &str, variant_name: &str) -> ClientResult<()> {
        let path = format!("/repertoires/{repertoire_id}/variantsInfo");
        let req = self
            .request(Method::DELETE, &path)
            .query(&[("variantName", variant_name)]);
        self.send(Method::DELETE, &path, req).await?;
        Ok(())
    }

    /// `POST /position-errors`
    pub async fn post_position_error(&self, report: &PositionErrorReport) -> ClientResult<()> {
        let path = "/position-errors";
        let req = self.request(Method::POST, path).json(report);
        self.send(Method::POST, path, req).await?;
        Ok(())
    }

    /// `GET /paths`
    pub async fn path(&self) -> ClientResult<PathLesson> {
        self.get_json("/paths").await
    }

    /// `GET /paths/plan`
    pub async fn plan(&self) -> ClientResult<PathPlanSummary> {
        self.get_json("/paths/plan").await
    }

    /// `GET /paths/analytics`
    pub async fn analytics(&self) -> ClientResult<serde_json::Value> {
        self.get_json("/paths/analytics").await
    }
}

#[async_trait]
impl ReviewBackend for RepertoireClient {
    async fn get_repertoire(&self, repertoire_id: &str) -> Result<Repertoire, BackendError> {
        Ok(self.repertoire(repertoire_id).await?)
    }

    async fn get_variants_info(&self, repertoire_id: &str) -> Result<Vec<TrainVariantInfo>, BackendError> {
        Ok(self.variants_info(repertoire_id).await?)
    }

    async fn submit_variant_review(&self, review: &VariantReviewSubmission) -> Result<(), BackendError> {
        Ok(self.post_variant_review(review).await?)
    }

    async fn delete_variant_info(&self, repertoire_id: &str, variant_name: &str) -> Result<(), BackendError> {
        Ok(self.delete_variant(repertoire_id, variant_name).await?)
    }

    async fn record_position_error(&self, report: &PositionErrorReport) -> Result<(), BackendError> {
        Ok(self.post_position_error(report).await?)
    }

    async fn get_path(&self) -> Result<PathLesson, BackendError> {
        Ok(self.path().await?)
    }

    async fn get_plan(&self) -> Result<PathPlanSummary, BackendError> {
        Ok(self.plan().await?)
    }

    async fn get_analytics(&self) -> Result<serde_json::Value, BackendError> {
        Ok(self.analytics().await?)
    }
}
