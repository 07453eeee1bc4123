//! Chat endpoint

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use sluice_gateway::{ChatRequest, ChatResponse, Gateway};
use std::sync::Arc;

use super::ApiError;

/// `POST /v1/chat` — route and answer one query
async fn chat(
    Extension(gateway): Extension<Arc<Gateway>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = gateway.handle(request).await?;
    Ok(Json(response))
}

/// Create chat routes
pub fn chat_routes() -> Router {
    Router::new().route("/v1/chat", post(chat))
}
