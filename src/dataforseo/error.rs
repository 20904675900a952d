//! Errors raised while talking to the DataForSEO API.

use thiserror::Error;

/// Failure of a single DataForSEO request.
///
/// Cloneable so that one failure can be handed to every caller waiting on a
/// coalesced review job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200-299.
    #[error("DataForSEO API error: {status} {status_text}")]
    Transport { status: u16, status_text: String },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("DataForSEO request failed: {0}")]
    Http(String),

    /// HTTP succeeded but the payload carries a non-success provider code.
    #[error("DataForSEO provider error {code}: {message}")]
    Provider { code: u32, message: String },

    /// The payload did not have the expected shape.
    #[error("Unexpected DataForSEO response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Shape(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
