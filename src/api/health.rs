//! Health check endpoint
//!
//! `GET /health` — status, healthy model count, and exact-cache counters,
//! cheap enough for load balancers.

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use sluice_cache::CacheStats;
use sluice_gateway::Gateway;
use std::sync::Arc;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub available_models: usize,
    pub cache: CacheStats,
}

async fn health_check(Extension(gateway): Extension<Arc<Gateway>>) -> Json<HealthResponse> {
    let available_models = gateway.healthy_model_count();
    Json(HealthResponse {
        status: if available_models > 0 { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        available_models,
        cache: gateway.cache_stats(),
    })
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}
