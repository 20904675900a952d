//! # Review Agent
//!
//! A tool server for business-review, geocoding and WHOIS agents, backed by
//! the DataForSEO and Google Geocoding APIs.
//!
//! This library provides:
//! - An asynchronous review job client (submit, poll, normalize)
//! - Single-flight coalescing of identical concurrent review requests
//! - Agent-facing tools and an HTTP API to invoke them
//!
//! ## Architecture
//!
//! A review request follows the provider's task model:
//! 1. Validate the query and geocode its address if needed
//! 2. Join an identical in-flight job, or submit a new one
//! 3. Poll the job until it is ready or the attempt budget runs out
//! 4. Keep only reviews rated 4 or higher with non-empty text
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use review_agent::dataforseo::DataForSeoClient;
//! use review_agent::reviews::{ReviewQuery, ReviewService, RetryPolicy};
//!
//! let client = DataForSeoClient::new(credential, DEFAULT_BASE_URL, timeout)?;
//! let service = ReviewService::new(Arc::new(client), RetryPolicy::default());
//! let outcome = service
//!     .get_reviews(ReviewQuery::trustpilot("www.example.com"))
//!     .await?;
//! ```

pub mod api;
pub mod config;
pub mod dataforseo;
pub mod geocoding;
pub mod reviews;
pub mod tools;

pub use config::Config;
