//! Review queries: validation, task body construction and fingerprinting.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::error::ReviewError;

/// Default review language.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Default number of reviews requested from the provider.
pub const DEFAULT_LIMIT: u32 = 3;

/// DataForSEO task priority (2 = high).
const TASK_PRIORITY: u8 = 2;

/// Where reviews come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    /// Google Maps business reviews (located by coordinates/address)
    Google,
    /// Trustpilot reviews (located by domain)
    Trustpilot,
}

impl ReviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Trustpilot => "trustpilot",
        }
    }
}

impl std::fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for reviews of one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQuery {
    /// Review source
    #[serde(rename = "reviewType")]
    pub source: ReviewSource,

    /// `"lat,lon"` of the business (Google)
    #[serde(default)]
    pub coordinates: Option<String>,

    /// Free-text address, geocoded into `coordinates` (Google)
    #[serde(default)]
    pub address: Option<String>,

    /// Business name or search keyword (Google)
    #[serde(default)]
    pub keyword: Option<String>,

    /// Google Place ID, preferred over `keyword` when both are set
    #[serde(default)]
    pub place_id: Option<String>,

    /// Business domain (Trustpilot)
    #[serde(default)]
    pub domain: Option<String>,

    /// Review language
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum number of reviews requested
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Treat empty and whitespace-only strings as absent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ReviewQuery {
    /// Start a Google query.
    pub fn google() -> Self {
        Self::new(ReviewSource::Google)
    }

    /// Start a Trustpilot query for `domain`.
    pub fn trustpilot(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Self::new(ReviewSource::Trustpilot)
        }
    }

    fn new(source: ReviewSource) -> Self {
        Self {
            source,
            coordinates: None,
            address: None,
            keyword: None,
            place_id: None,
            domain: None,
            language: default_language(),
            limit: default_limit(),
        }
    }

    pub fn with_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.coordinates = Some(coordinates.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn coordinates(&self) -> Option<&str> {
        present(&self.coordinates)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.address)
    }

    /// Check the per-source required fields.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.limit == 0 {
            return Err(ReviewError::Validation(
                "limit must be at least 1".to_string(),
            ));
        }

        match self.source {
            ReviewSource::Google => {
                if self.coordinates().is_none() && self.address().is_none() {
                    return Err(ReviewError::Validation(
                        "Coordinates are required for Google reviews".to_string(),
                    ));
                }
                if present(&self.keyword).is_none() && present(&self.place_id).is_none() {
                    return Err(ReviewError::Validation(
                        "Either keyword or place_id is required for Google reviews".to_string(),
                    ));
                }
            }
            ReviewSource::Trustpilot => {
                if present(&self.domain).is_none() {
                    return Err(ReviewError::Validation(
                        "domain is required for Trustpilot reviews".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Build the `task_post` body (a one-element task array).
    pub fn task_body(&self) -> Value {
        let mut task = Map::new();
        task.insert("language_name".into(), json!(self.language));
        task.insert("depth".into(), json!(self.limit));
        task.insert("priority".into(), json!(TASK_PRIORITY));

        match self.source {
            ReviewSource::Google => {
                if let Some(coordinates) = self.coordinates() {
                    task.insert("location_coordinate".into(), json!(coordinates));
                }
                if let Some(place_id) = present(&self.place_id) {
                    task.insert("place_id".into(), json!(place_id));
                } else if let Some(keyword) = present(&self.keyword) {
                    task.insert("keyword".into(), json!(keyword));
                }
            }
            ReviewSource::Trustpilot => {
                if let Some(domain) = present(&self.domain) {
                    task.insert("domain".into(), json!(domain));
                }
            }
        }

        Value::Array(vec![Value::Object(task)])
    }

    /// Canonical hash of every field that identifies the provider job.
    ///
    /// Two queries with the same fingerprint would submit identical tasks, so
    /// they may share one in-flight job. The address is excluded because it
    /// only matters until it has been geocoded into coordinates.
    pub fn fingerprint(&self) -> String {
        let canonical = json!({
            "source": self.source.as_str(),
            "body": self.task_body(),
            "address": if self.coordinates().is_none() { self.address() } else { None },
        });
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        hex::encode(digest)
    }
}
