//! Address to coordinates lookup via the Google Geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default Google Maps API host.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    #[error("Geocoding API error: {status} {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("Geocoding request failed: {0}")]
    Http(String),

    /// The API answered but found nothing usable.
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid geocoding response: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for GeocodingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Shape(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// A resolved address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedAddress {
    /// `"lat,lng"`
    pub coordinates: String,
    pub formatted_address: String,
    /// Precision marker such as `ROOFTOP` or `APPROXIMATE`
    pub location_type: String,
}

/// Something that can turn an address into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(
        &self,
        address: &str,
        language: Option<&str>,
    ) -> Result<GeocodedAddress, GeocodingError>;
}

// -- Geocoding API response types --

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
    #[serde(default)]
    location_type: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn request_url(&self, address: &str, language: Option<&str>) -> Result<Url, GeocodingError> {
        let mut url = Url::parse(&format!("{}/maps/api/geocode/json", self.base_url))
            .map_err(|e| GeocodingError::Http(format!("invalid geocoding URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("address", address);
            query.append_pair("key", &self.api_key);
            if let Some(language) = language {
                query.append_pair("language", language);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(
        &self,
        address: &str,
        language: Option<&str>,
    ) -> Result<GeocodedAddress, GeocodingError> {
        let url = self.request_url(address, language)?;
        tracing::debug!(address, "Geocoding address");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        match body.results.into_iter().next() {
            Some(result) if body.status == "OK" => Ok(GeocodedAddress {
                coordinates: format!(
                    "{},{}",
                    result.geometry.location.lat, result.geometry.location.lng
                ),
                formatted_address: result.formatted_address,
                location_type: result.geometry.location_type,
            }),
            _ => Err(GeocodingError::NotFound(body.error_message.unwrap_or_else(
                || format!("Failed to obtain coordinates for the address: {}", body.status),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> GoogleGeocoder {
        GoogleGeocoder::new("map-key", server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn resolves_first_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "1600 Amphitheatre Parkway"))
            .and(query_param("key", "map-key"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                    "geometry": {
                        "location": {"lat": 37.4224764, "lng": -122.0842499},
                        "location_type": "ROOFTOP"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let found = geocoder(&server)
            .geocode("1600 Amphitheatre Parkway", Some("en"))
            .await
            .unwrap();

        assert_eq!(found.coordinates, "37.4224764,-122.0842499");
        assert_eq!(found.location_type, "ROOFTOP");
    }

    #[tokio::test]
    async fn zero_results_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("nowhere", None).await.unwrap_err();
        assert_eq!(
            err,
            GeocodingError::NotFound(
                "Failed to obtain coordinates for the address: ZERO_RESULTS".to_string()
            )
        );
    }

    #[tokio::test]
    async fn provider_message_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            })))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("x", None).await.unwrap_err();
        assert_eq!(err.to_string(), "The provided API key is invalid.");
    }

    #[tokio::test]
    async fn http_error_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("x", None).await.unwrap_err();
        assert!(matches!(err, GeocodingError::Transport { status: 500, .. }));
    }
}
