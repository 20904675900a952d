//! `get-reviews`: recent good reviews of a business from Google or Trustpilot.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;
use crate::reviews::{JobOutcome, ReviewError, ReviewQuery, ReviewRecord, ReviewService};

#[derive(Debug, Deserialize)]
struct ReviewsArgs {
    #[serde(flatten)]
    query: ReviewQuery,
    /// Job reported as pending by an earlier call
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ReviewsStatus {
    Success,
    NoReviewsFound,
    Error,
    /// The job is still running at the provider; retry with `task_id`.
    Pending,
}

#[derive(Debug, Serialize)]
struct ReviewsOutput {
    status: ReviewsStatus,
    reviews: Vec<ReviewRecord>,
    #[serde(rename = "taskId")]
    task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ReviewsOutput {
    fn from_result(result: Result<JobOutcome, ReviewError>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(ReviewError::PollExhausted { job_id, attempts }) => Self {
                status: ReviewsStatus::Pending,
                reviews: Vec::new(),
                error: Some(format!(
                    "Task {} not ready after {} attempts",
                    job_id, attempts
                )),
                task_id: Some(job_id),
            },
            Err(err) => {
                tracing::warn!(error = %err, "Review request failed");
                Self::from_outcome(JobOutcome::from(err))
            }
        }
    }

    fn from_outcome(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success { reviews, job_id } => Self {
                status: ReviewsStatus::Success,
                reviews,
                task_id: Some(job_id),
                error: None,
            },
            JobOutcome::Empty { job_id } => Self {
                status: ReviewsStatus::NoReviewsFound,
                reviews: Vec::new(),
                task_id: Some(job_id),
                error: None,
            },
            JobOutcome::Error { job_id, reason } => Self::error(job_id, reason),
        }
    }

    fn error(task_id: Option<String>, reason: String) -> Self {
        Self {
            status: ReviewsStatus::Error,
            reviews: Vec::new(),
            task_id,
            error: Some(reason),
        }
    }
}

/// Fetch reviews through a shared [`ReviewService`].
pub struct ReviewsTool {
    service: Arc<ReviewService>,
}

impl ReviewsTool {
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ReviewsTool {
    fn name(&self) -> &str {
        "get-reviews"
    }

    fn description(&self) -> &str {
        "Get recent reviews (rated 4 or higher) of a business from Google or Trustpilot. Google needs coordinates (or an address) and a keyword or place_id; Trustpilot needs the business domain. If the status is 'pending', call again with the returned taskId as task_id."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reviewType": {
                    "type": "string",
                    "enum": ["google", "trustpilot"],
                    "description": "Review source"
                },
                "coordinates": {
                    "type": "string",
                    "description": "Business location as 'latitude,longitude' (Google)"
                },
                "address": {
                    "type": "string",
                    "description": "Business address, used when coordinates are unknown (Google)"
                },
                "keyword": {
                    "type": "string",
                    "description": "Business name (Google)"
                },
                "place_id": {
                    "type": "string",
                    "description": "Google Place ID, preferred over keyword (Google)"
                },
                "domain": {
                    "type": "string",
                    "description": "Business domain, e.g. www.example.com (Trustpilot)"
                },
                "language": {
                    "type": "string",
                    "description": "Review language (default: english)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of reviews to request (default: 3)"
                },
                "task_id": {
                    "type": "string",
                    "description": "Resume a job reported as pending"
                }
            },
            "required": ["reviewType"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let output = match serde_json::from_value::<ReviewsArgs>(args) {
            Ok(ReviewsArgs {
                query,
                task_id: Some(task_id),
            }) => ReviewsOutput::from_result(self.service.resume(query.source, &task_id).await),
            Ok(ReviewsArgs { query, task_id: None }) => {
                ReviewsOutput::from_result(self.service.get_reviews(query).await)
            }
            Err(e) => ReviewsOutput::error(None, format!("Invalid arguments: {}", e)),
        };

        Ok(serde_json::to_string(&output)?)
    }
}
