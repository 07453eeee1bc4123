//! Sluice LLM - provider abstraction
//!
//! This crate provides the model invocation capability the gateway core
//! consumes:
//! - Provider: the `ChatProvider` trait (model name + prompt + token budget)
//! - Registry: model-name → provider dispatch
//! - OpenAI-compatible: one adapter covering OpenAI/DeepSeek/Groq-style APIs
//! - Ollama: local daemon provider
//! - Embeddings: vector embeddings for the semantic cache
//! - Mock: scriptable provider for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embeddings;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod registry;

pub use embeddings::{
    EmbeddingProvider, HttpEmbeddingConfig, HttpEmbeddingProvider, SharedEmbeddingProvider,
    UnavailableEmbedder,
};
pub use error::{Error, Result};
pub use mock::MockProvider;
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use provider::ChatProvider;
pub use registry::ProviderRegistry;
