//! HTTP client for the DataForSEO v3 API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::error::ApiError;
use super::types::{ApiEnvelope, Task};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";

/// Thin, stateless wrapper around `reqwest` that knows how to authenticate
/// against DataForSEO and unwrap its envelope.
///
/// Cloning is cheap (the inner `reqwest::Client` is reference counted), so a
/// single instance can be shared between all tools and concurrent jobs.
#[derive(Debug, Clone)]
pub struct DataForSeoClient {
    http: Client,
    base_url: String,
    credential: String,
}

impl DataForSeoClient {
    /// Create a client.
    ///
    /// `credential` is the already base64-encoded `login:password` pair sent
    /// as `Authorization: Basic <credential>`.
    pub fn new(
        credential: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("review-agent/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: credential.into(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a task array to `/v3/{path}` and return the first task.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Task, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, body = %body, "DataForSEO POST");
        self.send(self.http.post(&url).json(body)).await
    }

    /// GET `/v3/{path}` and return the first task.
    pub async fn get(&self, path: &str) -> Result<Task, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "DataForSEO GET");
        self.send(self.http.get(&url)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Task, ApiError> {
        let response = request
            .header(AUTHORIZATION, format!("Basic {}", self.credential))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        envelope.into_first_task()
    }
}
