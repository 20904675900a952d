//! HTTP API for the tool server.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/tools` - List tools and their argument schemas
//! - `POST /api/tools/:name` - Execute a tool with a JSON argument body

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
