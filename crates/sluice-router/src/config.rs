//! Routing configuration
//!
//! Loaded once from YAML at startup. Declares the candidate models, the
//! static fallback chain, the routing rules, and optional tier weight
//! overrides.

use crate::candidate::{Candidate, UserTier};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Per-model metadata as written in the config file.
///
/// The model name is the map key; [`RoutingConfig::candidates`] folds it back
/// into a full [`Candidate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    /// Price per 1 000 tokens in USD
    pub price_per_1k: f64,
    /// Quality score in `[0, 1]`
    pub quality_score: f64,
    /// Intent labels the model is strong at
    #[serde(default)]
    pub supported_intents: Vec<String>,
    /// Rate limit in requests per minute
    #[serde(default = "default_max_rpm")]
    pub max_rpm: u32,
}

fn default_max_rpm() -> u32 {
    60
}

/// Predicate over `(intent, user_tier)`.
///
/// All present fields must hold for the condition to match; an empty
/// condition matches every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Required intent label, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Required user tier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_tier: Option<UserTier>,
}

impl RuleCondition {
    /// Evaluate the condition against a request's intent and tier
    #[must_use]
    pub fn matches(&self, intent: &str, tier: UserTier) -> bool {
        self.intent.as_deref().is_none_or(|i| i == intent)
            && self.user_tier.is_none_or(|t| t == tier)
    }
}

/// A routing rule: first match with a non-empty pool wins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterRule {
    /// Rule name, for logs and diagnostics
    pub name: String,
    /// Match condition
    pub when: RuleCondition,
    /// Candidate pool restriction; empty means "all candidates"
    #[serde(default)]
    pub pool: Vec<String>,
}

/// Scoring weights for one tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    /// Weight applied to the quality score
    pub quality: f64,
    /// Weight applied to the inverse-price cost score
    pub cost: f64,
    /// Weight applied to the intent-affinity bonus
    pub intent: f64,
}

/// Per-tier scoring weights, conventionally summing to 1.0 (not enforced)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierWeights {
    /// Premium favors quality
    pub premium: Weights,
    /// Basic is balanced
    pub basic: Weights,
    /// Free favors cost
    pub free: Weights,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            premium: Weights {
                quality: 0.6,
                cost: 0.2,
                intent: 0.2,
            },
            basic: Weights {
                quality: 0.4,
                cost: 0.4,
                intent: 0.2,
            },
            free: Weights {
                quality: 0.3,
                cost: 0.5,
                intent: 0.2,
            },
        }
    }
}

impl TierWeights {
    /// Weights for a tier
    #[must_use]
    pub fn for_tier(&self, tier: UserTier) -> Weights {
        match tier {
            UserTier::Premium => self.premium,
            UserTier::Basic => self.basic,
            UserTier::Free => self.free,
        }
    }
}

/// Complete routing configuration (YAML structure)
///
/// `models` is a sorted map so candidate iteration order — and therefore
/// score tie-breaking — is deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Candidate models keyed by name
    pub models: BTreeMap<String, CandidateSpec>,
    /// Model used when nothing else is specified
    pub default_model: String,
    /// Static ordered fallback chain
    #[serde(default)]
    pub fallback_chain: Vec<String>,
    /// Routing rules, evaluated in declared order
    #[serde(default)]
    pub rules: Vec<RouterRule>,
    /// Tier weight overrides
    #[serde(default)]
    pub weights: TierWeights,
}

impl RoutingConfig {
    /// Load and validate a routing config from a YAML file.
    ///
    /// Fallback-chain entries naming undeclared models are dropped with a
    /// warning, so cost lookup always resolves for whichever model answers.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and normalize an in-memory config
    pub fn validate(&mut self) -> Result<()> {
        if !self.models.contains_key(&self.default_model) {
            return Err(Error::UnknownModel(self.default_model.clone()));
        }

        let models = &self.models;
        self.fallback_chain.retain(|name| {
            let known = models.contains_key(name);
            if !known {
                warn!(model = %name, "Dropping unknown model from fallback chain");
            }
            known
        });

        Ok(())
    }

    /// Build the full candidate list in deterministic (name) order
    #[must_use]
    pub fn candidates(&self) -> Vec<Candidate> {
        self.models
            .iter()
            .map(|(name, spec)| Candidate {
                name: name.clone(),
                price_per_1k: spec.price_per_1k,
                quality_score: spec.quality_score,
                supported_intents: spec.supported_intents.clone(),
                max_rpm: spec.max_rpm,
            })
            .collect()
    }
}
