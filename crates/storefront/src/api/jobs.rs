//! Job listings and applications.

use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{Job, JobApplication};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List open positions (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        if let Some(CacheValue::Jobs(jobs)) = self.inner.cache.get(&CacheKey::Jobs).await {
            debug!("Cache hit for jobs");
            return Ok(jobs);
        }

        let jobs: Vec<Job> = self.get("/jobs", None).await?;
        self.inner
            .cache
            .insert(CacheKey::Jobs, CacheValue::Jobs(jobs.clone()))
            .await;
        Ok(jobs)
    }

    /// Apply for a position.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, application), fields(job_id = %application.job_id))]
    pub async fn apply_for_job(
        &self,
        application: &JobApplication<'_>,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::POST, "/jobs/apply", application, None)
            .await
    }
}
