//! API request and response types.

use serde::Serialize;

use crate::tools::ToolSchema;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Whether address geocoding is configured
    pub geocoding: bool,
}

/// Registered tools and their argument schemas.
#[derive(Debug, Clone, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolSchema>,
}

/// Error body returned by the tool endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
