//! Per-model health flags
//!
//! A mutable boolean per model name, defaulting to healthy. Written by the
//! admin surface, read on every selection.

use crate::candidate::Candidate;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

/// Tracks which models are currently eligible for selection
pub struct HealthTracker {
    flags: RwLock<HashMap<String, bool>>,
}

impl HealthTracker {
    /// Create a tracker with every listed model healthy
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags = names.into_iter().map(|n| (n.into(), true)).collect();
        Self {
            flags: RwLock::new(flags),
        }
    }

    /// Set a model's health flag. Unknown names are ignored; returns whether
    /// the name was known.
    pub fn set(&self, name: &str, healthy: bool) -> bool {
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        match flags.get_mut(name) {
            Some(flag) => {
                *flag = healthy;
                info!(model = %name, healthy, "Model health updated");
                true
            }
            None => false,
        }
    }

    /// Whether a model is currently healthy. Untracked names default healthy.
    #[must_use]
    pub fn is_healthy(&self, name: &str) -> bool {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        flags.get(name).copied().unwrap_or(true)
    }

    /// Filter a candidate list down to the healthy ones
    #[must_use]
    pub fn healthy(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        candidates
            .iter()
            .filter(|c| flags.get(&c.name).copied().unwrap_or(true))
            .cloned()
            .collect()
    }
}
