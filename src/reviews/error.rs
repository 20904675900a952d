//! Review workflow errors.

use thiserror::Error;

use crate::dataforseo::ApiError;
use crate::geocoding::GeocodingError;

/// Everything that can go wrong while fetching reviews.
///
/// `Clone` is required: a coalesced job hands the same error to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The query is missing required fields; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Submitting or fetching the job failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The job never completed within the attempt budget.
    #[error("Max polling attempts reached ({attempts}) for task {job_id}")]
    PollExhausted { job_id: String, attempts: u32 },

    /// Resolving the address to coordinates failed.
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    /// The shared job task died without producing a result.
    #[error("Review job aborted: {0}")]
    Internal(String),
}

impl ReviewError {
    /// Job id the error belongs to, when the job got that far.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::PollExhausted { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for ReviewError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::Internal("review job panicked".to_string())
        } else {
            Self::Internal("review job was cancelled".to_string())
        }
    }
}
