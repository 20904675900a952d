//! DataForSEO API access.
//!
//! Everything DataForSEO-specific that is not about reviews lives here: the
//! authenticated HTTP client, the shared response envelope and its error type.

mod client;
mod error;
pub mod types;

pub use client::{DataForSeoClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use types::{ApiEnvelope, Task};
