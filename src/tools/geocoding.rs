//! `geocoding`: turn an address into coordinates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Tool;
use crate::geocoding::{Geocoder, GeocodingError};

#[derive(Debug, Deserialize)]
struct GeocodingArgs {
    address: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Resolve addresses through a [`Geocoder`].
pub struct GeocodingTool {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodingTool {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl Tool for GeocodingTool {
    fn name(&self) -> &str {
        "geocoding"
    }

    fn description(&self) -> &str {
        "Convert an address into geographic coordinates ('latitude,longitude'). Use it to get the coordinates needed for Google reviews."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "The address to geocode"
                },
                "language": {
                    "type": "string",
                    "description": "Language of the formatted address (default: en)"
                }
            },
            "required": ["address"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let args: GeocodingArgs = serde_json::from_value(args)
            .map_err(|e| anyhow::anyhow!("Missing or invalid 'address' argument: {}", e))?;

        let output = match self.geocoder.geocode(&args.address, Some(&args.language)).await {
            Ok(found) => json!({
                "status": "success",
                "coordinates": found.coordinates,
                "formatted_address": found.formatted_address,
                "location_type": found.location_type,
            }),
            Err(err @ (GeocodingError::Transport { .. } | GeocodingError::Http(_))) => {
                return Err(err.into());
            }
            Err(err) => json!({
                "status": "error",
                "error_message": err.to_string(),
            }),
        };

        Ok(output.to_string())
    }
}
