//! Administrative endpoints

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use sluice_gateway::{Gateway, RouteReport, UsageStats};
use sluice_router::UserTier;
use std::sync::Arc;

/// Body for `POST /admin/health`
#[derive(Debug, Deserialize)]
struct SetHealthRequest {
    model: String,
    healthy: bool,
}

/// Generic message response
#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Query parameters for `GET /debug/route`
#[derive(Debug, Deserialize)]
struct DebugRouteParams {
    query: String,
    #[serde(default)]
    user_tier: UserTier,
}

/// Flip a model's health flag
async fn set_health(
    Extension(gateway): Extension<Arc<Gateway>>,
    Json(request): Json<SetHealthRequest>,
) -> Result<Json<MessageResponse>, StatusCode> {
    if !gateway.set_model_health(&request.model, request.healthy) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(MessageResponse {
        message: format!("{} health set to {}", request.model, request.healthy),
    }))
}

/// Empty the exact cache
async fn clear_cache(Extension(gateway): Extension<Arc<Gateway>>) -> Json<MessageResponse> {
    gateway.clear_cache();
    Json(MessageResponse {
        message: "cache cleared".to_string(),
    })
}

/// Score all candidates for a query without invoking anything
async fn debug_route(
    Extension(gateway): Extension<Arc<Gateway>>,
    Query(params): Query<DebugRouteParams>,
) -> Json<RouteReport> {
    Json(gateway.debug_route(&params.query, params.user_tier))
}

/// Usage statistics over recent requests
async fn usage(Extension(gateway): Extension<Arc<Gateway>>) -> Json<UsageStats> {
    Json(gateway.usage_stats().await)
}

/// Create admin routes
pub fn admin_routes() -> Router {
    Router::new()
        .route("/admin/health", post(set_health))
        .route("/admin/usage", get(usage))
        .route("/cache/clear", post(clear_cache))
        .route("/debug/route", get(debug_route))
}
