//! Router construction and request handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::types::{ErrorResponse, HealthResponse, ToolListResponse};
use crate::config::Config;
use crate::tools::ToolRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tools: Arc<ToolRegistry>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(execute_tool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let tools = Arc::new(ToolRegistry::from_config(&config)?);
    tracing::info!(tools = ?tools.list(), "Registered tools");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState { config, tools };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoding: state.config.geocoding.is_enabled(),
    })
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.get_tool_schemas(),
    })
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Execute a tool. An empty body means no arguments.
async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    if state.tools.get(&name).is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, format!("Unknown tool: {}", name)));
    }

    let args: Value = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        })?
    };

    let output = state.tools.execute(&name, args).await.map_err(|e| {
        tracing::error!(tool = %name, error = %e, "Tool execution failed");
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let value = serde_json::from_str(&output).unwrap_or(Value::String(output));
    Ok(Json(value))
}
