//! Local Ollama provider
//!
//! Talks to a local Ollama daemon over its native chat API. Useful as a
//! zero-cost fallback at the end of a routing chain.

use crate::error::{Error, Result};
use crate::provider::ChatProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Ollama API URL
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Sanitize errors from the local daemon
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("connection refused") || lower.contains("failed to connect") {
        return "Failed to connect to Ollama. Is Ollama running?".to_string();
    }

    if lower.contains("model") && (lower.contains("not found") || lower.contains("pull")) {
        return "Model not available. Pull it first with: ollama pull <model>".to_string();
    }

    if error.len() < 100 {
        return error.to_string();
    }

    "An error occurred. Please try again.".to_string()
}

/// Configuration for the Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama daemon
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OllamaConfig {
    /// Create a configuration with a custom base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Local Ollama provider
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
    models: Vec<String>,
}

impl OllamaProvider {
    /// Create a new provider serving the given models
    #[must_use]
    pub fn new(config: OllamaConfig, models: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            models,
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn supported_models(&self) -> Vec<String> {
        self.models.clone()
    }

    #[instrument(skip(self, prompt))]
    async fn invoke(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = OllamaChatRequest {
            model: model.to_string(),
            messages: vec![OllamaMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            stream: false,
            options: Some(OllamaOptions {
                num_predict: max_tokens,
            }),
        };

        let url = format!("{}/api/chat", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(sanitize_api_error(&body)));
        }

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        if chat.message.content.is_empty() {
            return Err(Error::InvalidResponse(format!(
                "model {model} returned an empty completion"
            )));
        }

        debug!(model = %model, chars = chat.message.content.len(), "Completion received");
        Ok(chat.message.content)
    }
}
