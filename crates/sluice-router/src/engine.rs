//! Scoring & selection engine
//!
//! Computes a weighted score per candidate given a user tier and intent,
//! applies rule-based overrides, and produces the ordered attempt chain.

use crate::candidate::{Candidate, UserTier};
use crate::config::RoutingConfig;
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Guards the inverse-price cost score against free models
const PRICE_EPSILON: f64 = 0.001;

/// Score bonus for candidates that declare support for the request intent
const INTENT_BONUS: f64 = 2.0;

/// Stateless selection engine over a loaded routing config
pub struct Engine {
    config: RoutingConfig,
    candidates: Vec<Candidate>,
}

impl Engine {
    /// Create an engine from a validated routing config
    #[must_use]
    pub fn new(config: RoutingConfig) -> Self {
        let candidates = config.candidates();
        Self { config, candidates }
    }

    /// All configured candidates, in deterministic name order
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The static fallback chain
    #[must_use]
    pub fn fallback_chain(&self) -> &[String] {
        &self.config.fallback_chain
    }

    /// Price per 1 000 tokens for a configured model
    #[must_use]
    pub fn price_of(&self, model: &str) -> Option<f64> {
        self.config.models.get(model).map(|m| m.price_per_1k)
    }

    /// Weighted score for one candidate.
    ///
    /// `quality*Wq + (1/(price+ε))*Wc + bonus*Wi`, weights by tier.
    #[must_use]
    pub fn score(&self, candidate: &Candidate, tier: UserTier, intent: &str) -> f64 {
        let weights = self.config.weights.for_tier(tier);
        let cost_score = 1.0 / (candidate.price_per_1k + PRICE_EPSILON);
        let intent_score = if candidate.supports_intent(intent) {
            INTENT_BONUS
        } else {
            0.0
        };
        candidate.quality_score * weights.quality
            + cost_score * weights.cost
            + intent_score * weights.intent
    }

    /// Select the best candidate name for `(tier, intent)`.
    ///
    /// Rules are evaluated in declared order; the first match whose
    /// restricted pool is non-empty short-circuits. Otherwise the full set is
    /// scored. Ties go to the first candidate in iteration order.
    pub fn select(
        &self,
        candidates: &[Candidate],
        tier: UserTier,
        intent: &str,
    ) -> Result<String> {
        if candidates.is_empty() {
            return Err(Error::NoCandidatesAvailable);
        }

        for rule in &self.config.rules {
            if !rule.when.matches(intent, tier) {
                continue;
            }
            let available: Vec<&Candidate> = if rule.pool.is_empty() {
                candidates.iter().collect()
            } else {
                candidates
                    .iter()
                    .filter(|c| rule.pool.iter().any(|p| p == &c.name))
                    .collect()
            };
            if let Some(best) = self.best_of(&available, tier, intent) {
                info!(rule = %rule.name, model = %best, tier = %tier, intent = %intent, "Rule matched");
                return Ok(best);
            }
        }

        let all: Vec<&Candidate> = candidates.iter().collect();
        let best = self
            .best_of(&all, tier, intent)
            .ok_or(Error::NoCandidatesAvailable)?;
        debug!(model = %best, tier = %tier, intent = %intent, "Scored selection");
        Ok(best)
    }

    /// Primary choice followed by the fallback chain, deduplicated,
    /// preserving order
    #[must_use]
    pub fn attempt_order(&self, primary: &str) -> Vec<String> {
        let mut order = vec![primary.to_string()];
        for name in &self.config.fallback_chain {
            if !order.iter().any(|m| m == name) {
                order.push(name.clone());
            }
        }
        order
    }

    /// Score every candidate, sorted descending — diagnostics only
    #[must_use]
    pub fn score_all(
        &self,
        candidates: &[Candidate],
        tier: UserTier,
        intent: &str,
    ) -> Vec<(String, f64)> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|c| (c.name.clone(), self.score(c, tier, intent)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    // First candidate wins ties, so the fold compares with strict `>`.
    // (`Iterator::max_by` would keep the last maximum instead.)
    fn best_of(&self, pool: &[&Candidate], tier: UserTier, intent: &str) -> Option<String> {
        let (first, rest) = pool.split_first()?;
        let mut best = *first;
        let mut best_score = self.score(best, tier, intent);
        for candidate in rest {
            let score = self.score(candidate, tier, intent);
            if score > best_score {
                best = candidate;
                best_score = score;
            }
        }
        Some(best.name.clone())
    }
}
