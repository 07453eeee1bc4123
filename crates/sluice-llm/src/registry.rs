//! Provider registry
//!
//! Maps model names to concrete [`ChatProvider`] adapters. The gateway core
//! only ever talks to this registry; it never constructs provider clients
//! itself.

use crate::error::{Error, Result};
use crate::provider::ChatProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry mapping model names to chat providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider for a model name. Later registrations win.
    pub fn register(&mut self, model: impl Into<String>, provider: Arc<dyn ChatProvider>) {
        let model = model.into();
        debug!(model = %model, provider = provider.name(), "Registering model provider");
        self.providers.insert(model, provider);
    }

    /// Get the provider serving a model
    #[must_use]
    pub fn get(&self, model: &str) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(model).cloned()
    }

    /// Check whether a model has a registered provider
    #[must_use]
    pub fn has_model(&self, model: &str) -> bool {
        self.providers.contains_key(model)
    }

    /// List registered model names
    #[must_use]
    pub fn model_names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// Invoke the provider registered for `model`
    pub async fn invoke(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let provider = self
            .get(model)
            .ok_or_else(|| Error::UnknownModel(model.to_string()))?;
        provider.invoke(model, prompt, max_tokens).await
    }
}
