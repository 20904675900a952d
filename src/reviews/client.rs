//! Submitting review jobs and fetching their status.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::dataforseo::{ApiError, DataForSeoClient, Task};

use super::query::ReviewSource;

/// A review job accepted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub source: ReviewSource,
    pub submitted_at: DateTime<Utc>,
}

/// Which review endpoint to hit.
#[derive(Debug, Clone, Copy)]
pub enum EndpointMode<'a> {
    /// `task_post`
    Submit,
    /// `task_get/{id}`
    Fetch(&'a str),
}

/// Path (relative to `/v3/`) of a review endpoint.
pub fn review_endpoint(source: ReviewSource, mode: EndpointMode<'_>) -> String {
    let base = format!("business_data/{}/reviews", source.as_str());
    match mode {
        EndpointMode::Submit => format!("{}/task_post", base),
        EndpointMode::Fetch(id) => format!("{}/task_get/{}", base, id),
    }
}

/// Remote side of the review workflow.
///
/// Implementations must be stateless with respect to jobs; retrying is the
/// poller's business, not theirs.
#[async_trait]
pub trait ReviewJobApi: Send + Sync {
    /// Submit a task body and return the created job.
    async fn submit(&self, source: ReviewSource, body: &Value) -> Result<Job, ApiError>;

    /// Fetch the current state of a job. Pending tasks are `Ok`.
    async fn fetch(&self, source: ReviewSource, job_id: &str) -> Result<Task, ApiError>;
}

#[async_trait]
impl ReviewJobApi for DataForSeoClient {
    async fn submit(&self, source: ReviewSource, body: &Value) -> Result<Job, ApiError> {
        let task = self
            .post(&review_endpoint(source, EndpointMode::Submit), body)
            .await?;

        if task.id.is_empty() {
            return Err(ApiError::Shape("task_post returned no task id".to_string()));
        }

        tracing::info!(job_id = %task.id, %source, "Review task submitted");

        Ok(Job {
            id: task.id,
            source,
            submitted_at: Utc::now(),
        })
    }

    async fn fetch(&self, source: ReviewSource, job_id: &str) -> Result<Task, ApiError> {
        self.get(&review_endpoint(source, EndpointMode::Fetch(job_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn endpoints() {
        assert_eq!(
            review_endpoint(ReviewSource::Google, EndpointMode::Submit),
            "business_data/google/reviews/task_post"
        );
        assert_eq!(
            review_endpoint(ReviewSource::Trustpilot, EndpointMode::Fetch("abc")),
            "business_data/trustpilot/reviews/task_get/abc"
        );
    }

    #[tokio::test]
    async fn submit_returns_job() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/business_data/google/reviews/task_post"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status_code": 20000,
                "tasks": [{"id": "job-42", "status_code": 20100, "status_message": "Task Created.", "result": null}]
            })))
            .mount(&server)
            .await;

        let client = DataForSeoClient::new("cred", server.uri(), Duration::from_secs(5)).unwrap();
        let job = client
            .submit(ReviewSource::Google, &json!([{"keyword": "coffee"}]))
            .await
            .unwrap();
        assert_eq!(job.id, "job-42");
        assert_eq!(job.source, ReviewSource::Google);
    }

    #[tokio::test]
    async fn submit_without_id_is_a_shape_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tasks": [{"status_code": 20100}]
            })))
            .mount(&server)
            .await;

        let client = DataForSeoClient::new("cred", server.uri(), Duration::from_secs(5)).unwrap();
        let err = client
            .submit(ReviewSource::Trustpilot, &json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Shape(_)));
    }

    #[tokio::test]
    async fn submit_http_failure_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = DataForSeoClient::new("cred", server.uri(), Duration::from_secs(5)).unwrap();
        let err = client
            .submit(ReviewSource::Google, &json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 401, .. }));
    }
}
