//! Request and response types

use serde::{Deserialize, Serialize};
use sluice_router::UserTier;

fn default_max_tokens() -> u32 {
    1000
}

/// An incoming chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Natural-language query
    pub query: String,
    /// Caller identity; not part of the shared cache key
    #[serde(default)]
    pub user_id: Option<String>,
    /// Caller tier weighting the selection scoring
    #[serde(default)]
    pub user_tier: UserTier,
    /// Token budget forwarded to the provider
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature; `0.0` marks the request deterministic and
    /// therefore exact-cacheable
    #[serde(default)]
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a request with defaults for everything but the query
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: None,
            user_tier: UserTier::default(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }

    /// Set the user tier
    #[must_use]
    pub fn with_tier(mut self, tier: UserTier) -> Self {
        self.user_tier = tier;
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A completed chat response
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Completion text
    pub text: String,
    /// Model that answered — `"cache"` / `"SemanticCache"` for cache tiers
    pub model: String,
    /// Estimated cost in USD, zero for cache hits
    pub cost: f64,
    /// Wall-clock latency in seconds
    pub latency: f64,
    /// Classified intent; absent on semantic-cache hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

/// Scored candidates for one hypothetical request, without invocation
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    /// Echoed query
    pub query: String,
    /// Classified intent
    pub intent: String,
    /// `(model, score)` pairs sorted by descending score
    pub scored: Vec<(String, f64)>,
}
