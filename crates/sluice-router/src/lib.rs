//! Sluice Router - candidate scoring and model selection
//!
//! This crate decides which model answers a request:
//! - Config: YAML-declared candidates, fallback chain, and routing rules
//! - Engine: tier-weighted scoring with rule-based pool overrides
//! - Health: per-model health flags read on every selection
//! - Intent: regex-based query classification feeding routing and cache TTLs

#![forbid(unsafe_code)]

pub mod candidate;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod intent;

pub use candidate::{Candidate, UserTier};
pub use config::{
    CandidateSpec, RouterRule, RoutingConfig, RuleCondition, TierWeights, Weights,
};
pub use engine::Engine;
pub use error::{Error, Result};
pub use health::HealthTracker;
pub use intent::{IntentClassifier, DEFAULT_INTENT};
