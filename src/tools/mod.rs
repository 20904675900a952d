//! Tools exposed to agents: business reviews, geocoding and domain WHOIS.
//!
//! Each tool takes JSON arguments and returns a JSON document as a string.
//! Expected failures (bad input, provider errors) are reported inside that
//! document; only unexpected failures come back as `Err`.

mod geocoding;
mod reviews;
mod whois;

pub use self::geocoding::GeocodingTool;
pub use self::reviews::ReviewsTool;
pub use self::whois::WhoisTool;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::dataforseo::DataForSeoClient;
use crate::geocoding::{Geocoder, GoogleGeocoder};
use crate::reviews::ReviewService;

/// A tool callable by name with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the tool is registered and invoked under.
    fn name(&self) -> &str;

    /// Human-readable description shown to agents.
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Schema of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for a configured server.
    ///
    /// The geocoding tool (and address lookup for reviews) is only available
    /// when a Maps API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = DataForSeoClient::new(
            config.dataforseo.credential.clone(),
            config.dataforseo.base_url.clone(),
            config.http_timeout,
        )?;

        let geocoder: Option<Arc<dyn Geocoder>> = match &config.geocoding.api_key {
            Some(key) => Some(Arc::new(GoogleGeocoder::new(
                key.clone(),
                config.geocoding.base_url.clone(),
                config.http_timeout,
            )?)),
            None => None,
        };

        let mut service = ReviewService::new(Arc::new(client.clone()), config.polling.clone());
        if let Some(geocoder) = &geocoder {
            service = service.with_geocoder(Arc::clone(geocoder));
        }

        let mut registry = Self::new();
        registry.register(Arc::new(ReviewsTool::new(Arc::new(service))));
        registry.register(Arc::new(WhoisTool::new(client)));
        if let Some(geocoder) = geocoder {
            registry.register(Arc::new(GeocodingTool::new(geocoder)));
        } else {
            tracing::warn!("MAP_API_KEY not set; geocoding tool disabled");
        }

        Ok(registry)
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names of registered tools, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Schemas of all registered tools, sorted by name.
    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|tool| ToolSchema {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tracing::debug!(tool = name, "Executing tool");
        tool.execute(args).await
    }
}
