//! Web API module
//!
//! Provides the gateway's HTTP endpoints:
//! - Chat completion routing
//! - Health and cache statistics
//! - Admin operations (model health, cache clear, usage, debug routing)

pub mod admin;
pub mod chat;
pub mod health;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde_json::json;

pub use admin::admin_routes;
pub use chat::chat_routes;
pub use health::health_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(chat_routes())
        .merge(admin_routes())
        .merge(health_routes())
}

/// JSON error wrapper mapping gateway errors to HTTP statuses
pub struct ApiError(pub sluice_gateway::Error);

impl From<sluice_gateway::Error> for ApiError {
    fn from(err: sluice_gateway::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            sluice_gateway::Error::EmptyQuery => StatusCode::BAD_REQUEST,
            sluice_gateway::Error::Selection(_) => StatusCode::SERVICE_UNAVAILABLE,
            sluice_gateway::Error::AllCandidatesExhausted { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
