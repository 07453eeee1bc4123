//! Chat provider trait definition
//!
//! This module defines the capability interface the gateway core consumes.
//! A provider takes a model name, a prompt, and a token budget, and either
//! returns the completion text or fails.

use crate::error::Result;

/// Trait for chat completion providers
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Models this provider can serve
    fn supported_models(&self) -> Vec<String>;

    /// Run a completion for `model` against `prompt` with a token budget.
    ///
    /// An empty completion is an error, never an empty success.
    async fn invoke(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String>;
}
