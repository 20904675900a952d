//! `get-whois`: estimated organic traffic value of a domain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;
use crate::dataforseo::{ApiError, DataForSeoClient, Task};

const WHOIS_ENDPOINT: &str = "domain_analytics/whois/overview/live";

const ETV_UNKNOWN: &str = "Unknown";
const ETV_ERROR: &str = "Error fetching data";

#[derive(Debug, Deserialize)]
struct WhoisArgs {
    domain: String,
}

#[derive(Debug, Serialize)]
struct WhoisOutput {
    #[serde(rename = "domainName")]
    domain_name: String,
    etv: Value,
}

// Typed view of `result[0].items[0].metrics.organic.etv`.

#[derive(Debug, Deserialize)]
struct WhoisResult {
    #[serde(default)]
    items: Option<Vec<WhoisItem>>,
}

#[derive(Debug, Deserialize)]
struct WhoisItem {
    #[serde(default)]
    metrics: Option<WhoisMetrics>,
}

#[derive(Debug, Deserialize)]
struct WhoisMetrics {
    #[serde(default)]
    organic: Option<OrganicMetrics>,
}

#[derive(Debug, Deserialize)]
struct OrganicMetrics {
    #[serde(default)]
    etv: Option<serde_json::Number>,
}

/// Pull the organic ETV out of a WHOIS overview task.
fn organic_etv(task: &Task) -> Result<Option<serde_json::Number>, ApiError> {
    let Some(result) = task.result.as_ref().filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let results = Vec::<WhoisResult>::deserialize(result)
        .map_err(|e| ApiError::Shape(format!("whois result: {}", e)))?;

    Ok(results
        .into_iter()
        .next()
        .and_then(|r| r.items)
        .and_then(|items| items.into_iter().next())
        .and_then(|item| item.metrics)
        .and_then(|metrics| metrics.organic)
        .and_then(|organic| organic.etv)
        .filter(|etv| etv.as_f64().is_some_and(|v| v != 0.0)))
}

/// Look up a domain through the DataForSEO WHOIS overview.
pub struct WhoisTool {
    client: DataForSeoClient,
}

impl WhoisTool {
    pub fn new(client: DataForSeoClient) -> Self {
        Self { client }
    }

    async fn lookup(&self, domain: &str) -> Result<Option<serde_json::Number>, ApiError> {
        let body = json!([{
            "limit": 1,
            "filters": [["domain", "=", domain]],
        }]);
        let task = self.client.post(WHOIS_ENDPOINT, &body).await?;
        organic_etv(&task)
    }
}

#[async_trait]
impl Tool for WhoisTool {
    fn name(&self) -> &str {
        "get-whois"
    }

    fn description(&self) -> &str {
        "Get WHOIS overview data for a domain, including its estimated organic traffic value (etv)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "Domain name without scheme, e.g. example.com"
                }
            },
            "required": ["domain"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let args: WhoisArgs = serde_json::from_value(args)
            .map_err(|e| anyhow::anyhow!("Missing or invalid 'domain' argument: {}", e))?;
        let domain = args.domain.trim();

        let etv = match self.lookup(domain).await {
            Ok(Some(etv)) => Value::Number(etv),
            Ok(None) => Value::String(ETV_UNKNOWN.to_string()),
            Err(err) => {
                tracing::warn!(domain, error = %err, "WHOIS lookup failed");
                Value::String(ETV_ERROR.to_string())
            }
        };

        let output = WhoisOutput {
            domain_name: domain.to_string(),
            etv,
        };
        Ok(serde_json::to_string(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(server: &MockServer) -> WhoisTool {
        let client =
            DataForSeoClient::new("Y3JlZA==", server.uri(), Duration::from_secs(5)).unwrap();
        WhoisTool::new(client)
    }

    fn envelope(result: Value) -> Value {
        json!({
            "status_code": 20000,
            "status_message": "Ok.",
            "tasks": [{
                "id": "whois-task",
                "status_code": 20000,
                "status_message": "Ok.",
                "result": result
            }]
        })
    }

    async fn run(tool: &WhoisTool, domain: &str) -> Value {
        let out = tool.execute(json!({ "domain": domain })).await.unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[tokio::test]
    async fn reports_organic_etv() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/domain_analytics/whois/overview/live"))
            .and(header("authorization", "Basic Y3JlZA=="))
            .and(body_json(json!([{
                "limit": 1,
                "filters": [["domain", "=", "example.com"]]
            }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
                "total_count": 1,
                "items": [{
                    "domain": "example.com",
                    "metrics": {"organic": {"etv": 1520.5, "count": 40}}
                }]
            }]))))
            .expect(1)
            .mount(&server)
            .await;

        let out = run(&tool(&server), "example.com").await;
        assert_eq!(out, json!({"domainName": "example.com", "etv": 1520.5}));
    }

    #[tokio::test]
    async fn missing_or_zero_etv_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
                "items": [{"metrics": {"organic": {"etv": 0}}}]
            }]))))
            .mount(&server)
            .await;

        let out = run(&tool(&server), "quiet.example").await;
        assert_eq!(out["etv"], "Unknown");
    }

    #[tokio::test]
    async fn empty_result_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .mount(&server)
            .await;

        let out = run(&tool(&server), "new.example").await;
        assert_eq!(out["etv"], "Unknown");
    }

    #[tokio::test]
    async fn failures_report_error_fetching_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let out = run(&tool(&server), "example.com").await;
        assert_eq!(out, json!({"domainName": "example.com", "etv": "Error fetching data"}));
    }

    #[tokio::test]
    async fn missing_domain_is_err() {
        let server = MockServer::start().await;
        assert!(tool(&server).execute(json!({})).await.is_err());
    }
}
