//! Server configuration types
//!
//! The application config (TOML) covers the server, cache tuning, and
//! provider wiring. The routing config (YAML, candidates/rules/fallbacks)
//! is referenced by path and loaded separately by `sluice-router`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default = "default_routing_config")]
    pub routing_config: String,
    /// Chat providers, registered for the models they list
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
}

fn default_routing_config() -> String {
    "config/router.yaml".to_string()
}

impl AppConfig {
    /// Load from a TOML file; a missing file falls back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self {
                routing_config: default_routing_config(),
                ..Self::default()
            });
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Exact-cache tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Background eviction sweep interval
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_cache_max_size() -> usize {
    5000
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

fn default_sweep_interval_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            default_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Semantic-cache tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Embedding endpoint base URL; unset disables the semantic tier
    #[serde(default)]
    pub embedding_base_url: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Environment variable holding the embedding API key
    #[serde(default = "default_embedding_key_env")]
    pub api_key_env: String,
}

fn default_threshold() -> f32 {
    0.95
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_embedding_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            embedding_base_url: None,
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            api_key_env: default_embedding_key_env(),
        }
    }
}

/// Kind of chat provider adapter to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` backend
    OpenaiCompat,
    /// Local Ollama daemon
    Ollama,
}

/// One provider block from the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Label for logs
    pub label: String,
    /// Base URL; required for openai-compat, optional for ollama
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key (openai-compat only)
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Models this provider serves; must match routing-config names
    pub models: Vec<String>,
}
