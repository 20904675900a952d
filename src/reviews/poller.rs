//! Polling a submitted job until the provider reports it ready.

use std::time::Duration;

use crate::dataforseo::Task;

use super::client::ReviewJobApi;
use super::error::ReviewError;
use super::query::ReviewSource;

/// How long and how often to poll.
///
/// ```
/// use review_agent::reviews::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 10);
/// assert_eq!(policy.pending_interval, Duration::from_secs(3));
/// assert_eq!(policy.error_interval, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fetch attempts before giving up.
    pub max_attempts: u32,
    /// Delay after a "not ready yet" answer.
    pub pending_interval: Duration,
    /// Delay after a failed fetch.
    pub error_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            pending_interval: Duration::from_secs(3),
            error_interval: Duration::from_secs(5),
        }
    }
}

/// Fetch `job_id` until it is ready, the budget runs out, or a fetch fails on
/// the last attempt.
///
/// Fetch failures before the last attempt are logged and retried after
/// `error_interval`. Running out of attempts yields
/// [`ReviewError::PollExhausted`]. No sleep happens after the final attempt.
pub async fn poll_until_ready(
    api: &dyn ReviewJobApi,
    source: ReviewSource,
    job_id: &str,
    policy: &RetryPolicy,
) -> Result<Task, ReviewError> {
    for attempt in 1..=policy.max_attempts {
        let is_last = attempt == policy.max_attempts;

        match api.fetch(source, job_id).await {
            Ok(task) if task.is_ready() => {
                tracing::info!(job_id, attempt, "Review task ready");
                return Ok(task);
            }
            Ok(task) => {
                tracing::debug!(
                    job_id,
                    attempt,
                    status_code = task.status_code,
                    status = %task.status_message,
                    "Review task not ready"
                );
                if !is_last {
                    tokio::time::sleep(policy.pending_interval).await;
                }
            }
            Err(e) => {
                tracing::warn!(
                    job_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Error checking review task status"
                );
                if is_last {
                    return Err(e.into());
                }
                tokio::time::sleep(policy.error_interval).await;
            }
        }
    }

    Err(ReviewError::PollExhausted {
        job_id: job_id.to_string(),
        attempts: policy.max_attempts,
    })
}
