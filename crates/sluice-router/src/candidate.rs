//! Candidate and user-tier types

use serde::{Deserialize, Serialize};

/// Caller classification that weights the selection scoring function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    /// Free tier — cost-weighted selection
    #[default]
    Free,
    /// Basic tier — balanced selection
    Basic,
    /// Premium tier — quality-weighted selection
    Premium,
}

impl UserTier {
    /// Stable lowercase label, matching the wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for UserTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable model profile
///
/// Immutable once loaded from the routing config; identified by `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique model name (also the provider-registry key)
    pub name: String,
    /// Price per 1 000 tokens in USD
    pub price_per_1k: f64,
    /// Quality score in `[0, 1]`
    pub quality_score: f64,
    /// Intent labels this model is considered strong at
    pub supported_intents: Vec<String>,
    /// Rate limit in requests per minute
    pub max_rpm: u32,
}

impl Candidate {
    /// Whether the candidate is considered strong at `intent`
    #[must_use]
    pub fn supports_intent(&self, intent: &str) -> bool {
        self.supported_intents.iter().any(|i| i == intent)
    }
}
