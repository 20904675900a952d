//! Business reviews via DataForSEO asynchronous tasks.
//!
//! The provider does not answer review requests synchronously. A request
//! goes through these steps:
//!
//! ```text
//! ReviewQuery ──validate──> geocode? ──> SingleFlight ──> submit (task_post)
//!                                             │
//!                                             ▼
//!                     normalize <── poll_until_ready (task_get/{id})
//! ```
//!
//! Identical concurrent queries share one provider job. Only reviews rated
//! 4 or higher with non-empty text are returned.

mod client;
mod coalescer;
mod error;
mod normalize;
mod poller;
mod query;
mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{review_endpoint, EndpointMode, Job, ReviewJobApi};
pub use coalescer::{Flight, SharedFlight, SingleFlight};
pub use error::ReviewError;
pub use normalize::{is_good_review, normalize, RatingValue, ReviewRecord, MIN_RATING};
pub use poller::{poll_until_ready, RetryPolicy};
pub use query::{ReviewQuery, ReviewSource, DEFAULT_LANGUAGE, DEFAULT_LIMIT};
pub use service::{JobOutcome, ReviewService};
