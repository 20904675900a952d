//! The end-to-end review workflow.

use std::sync::Arc;

use super::client::ReviewJobApi;
use super::coalescer::{Flight, SingleFlight};
use super::error::ReviewError;
use super::normalize::{normalize, ReviewRecord};
use super::poller::{poll_until_ready, RetryPolicy};
use super::query::{ReviewQuery, ReviewSource};
use crate::geocoding::Geocoder;

/// Final result of a review job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// At least one review passed the quality filter.
    Success {
        reviews: Vec<ReviewRecord>,
        job_id: String,
    },
    /// The job finished but nothing passed the filter.
    Empty { job_id: String },
    /// The workflow failed.
    Error {
        job_id: Option<String>,
        reason: String,
    },
}

impl JobOutcome {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Success { job_id, .. } | Self::Empty { job_id } => Some(job_id),
            Self::Error { job_id, .. } => job_id.as_deref(),
        }
    }

    pub fn reviews(&self) -> &[ReviewRecord] {
        match self {
            Self::Success { reviews, .. } => reviews,
            _ => &[],
        }
    }
}

impl From<ReviewError> for JobOutcome {
    fn from(err: ReviewError) -> Self {
        Self::Error {
            job_id: err.job_id().map(str::to_string),
            reason: err.to_string(),
        }
    }
}

/// Owns everything a review request needs: the provider API, an optional
/// geocoder, the polling policy and the table of in-flight jobs.
///
/// Share one instance (behind an `Arc`) between all callers; the in-flight
/// table only deduplicates requests that go through the same service.
pub struct ReviewService {
    api: Arc<dyn ReviewJobApi>,
    geocoder: Option<Arc<dyn Geocoder>>,
    policy: RetryPolicy,
    inflight: SingleFlight<String, JobOutcome, ReviewError>,
}

impl ReviewService {
    pub fn new(api: Arc<dyn ReviewJobApi>, policy: RetryPolicy) -> Self {
        Self {
            api,
            geocoder: None,
            policy,
            inflight: SingleFlight::new(),
        }
    }

    /// Resolve Google addresses through `geocoder`.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Jobs currently running.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.inflight.in_flight()
    }

    /// Validate `query`, then submit it (or join an identical running job),
    /// poll until ready and return the filtered reviews.
    pub async fn get_reviews(&self, query: ReviewQuery) -> Result<JobOutcome, ReviewError> {
        query.validate()?;
        let query = self.resolve_position(query).await?;
        let key = query.fingerprint();

        let api = Arc::clone(&self.api);
        let policy = self.policy.clone();
        let (flight, result) = self
            .inflight
            .get_or_create(key.clone(), move || run_job(api, policy, query));

        match flight {
            Flight::Joined => tracing::info!(key = %key, "Reusing in-flight review task"),
            Flight::Started => tracing::debug!(
                key = %key,
                in_flight = self.inflight.in_flight(),
                "Started review task"
            ),
        }

        result.await
    }

    /// Keep polling a job submitted earlier (e.g. one that was still pending
    /// when the attempt budget ran out).
    pub async fn resume(
        &self,
        source: ReviewSource,
        job_id: &str,
    ) -> Result<JobOutcome, ReviewError> {
        if job_id.trim().is_empty() {
            return Err(ReviewError::Validation("task_id must not be empty".to_string()));
        }

        let key = format!("task:{}:{}", source, job_id);
        let api = Arc::clone(&self.api);
        let policy = self.policy.clone();
        let job_id = job_id.to_string();
        let (flight, result) = self
            .inflight
            .get_or_create(key.clone(), move || collect(api, policy, source, job_id));

        if flight == Flight::Joined {
            tracing::info!(key = %key, "Reusing in-flight review poll");
        }

        result.await
    }

    /// Geocode the address of a Google query that has no coordinates.
    async fn resolve_position(&self, mut query: ReviewQuery) -> Result<ReviewQuery, ReviewError> {
        if query.source != ReviewSource::Google || query.coordinates().is_some() {
            return Ok(query);
        }
        let Some(address) = query.address().map(str::to_string) else {
            return Ok(query);
        };
        let Some(geocoder) = &self.geocoder else {
            return Err(ReviewError::Validation(
                "Coordinates are required for Google reviews (address lookup is not configured)"
                    .to_string(),
            ));
        };

        let found = geocoder.geocode(&address, None).await?;
        tracing::debug!(
            address = %address,
            coordinates = %found.coordinates,
            "Resolved review address"
        );
        query.coordinates = Some(found.coordinates);
        Ok(query)
    }
}

/// Submit `query`, then collect its result.
async fn run_job(
    api: Arc<dyn ReviewJobApi>,
    policy: RetryPolicy,
    query: ReviewQuery,
) -> Result<JobOutcome, ReviewError> {
    let job = api.submit(query.source, &query.task_body()).await?;
    collect(api, policy, job.source, job.id).await
}

/// Poll a submitted job and turn its payload into an outcome.
async fn collect(
    api: Arc<dyn ReviewJobApi>,
    policy: RetryPolicy,
    source: ReviewSource,
    job_id: String,
) -> Result<JobOutcome, ReviewError> {
    let task = poll_until_ready(api.as_ref(), source, &job_id, &policy).await?;
    let reviews = normalize(&task, source)?;

    tracing::info!(job_id = %job_id, reviews = reviews.len(), "Review task finished");

    if reviews.is_empty() {
        Ok(JobOutcome::Empty { job_id })
    } else {
        Ok(JobOutcome::Success { reviews, job_id })
    }
}
