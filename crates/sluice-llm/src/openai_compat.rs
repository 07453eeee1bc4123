//! OpenAI-compatible chat completions provider
//!
//! Covers any backend speaking the `/chat/completions` wire shape:
//! OpenAI, DeepSeek, Groq, SiliconFlow, and most hosted gateways.

use crate::error::{Error, Result};
use crate::provider::ChatProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Mask API key for safe display
fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

/// Sanitize API error messages before they reach logs or callers
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Check the configured API key.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "Provider rate limit exceeded. Please wait.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "Provider server error. Please try again later.".to_string();
    }

    if error.len() < 100 && !lower.contains("key") && !lower.contains("bearer") {
        return error.to_string();
    }

    "An API error occurred. Please try again.".to_string()
}

/// Configuration for an OpenAI-compatible provider
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// API key
    pub api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Provider label used in logs and registry listings
    pub label: String,
    /// Request timeout
    pub timeout: Duration,
}

// Custom Debug implementation to mask the API key
impl fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            label: label.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key from the named environment variable
    pub fn from_env(
        label: impl Into<String>,
        api_key_env: &str,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| Error::NotConfigured(format!("{api_key_env} not set")))?;
        Ok(Self::new(label, api_key, base_url))
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Wire types (chat completions subset)

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible provider
pub struct OpenAiCompatProvider {
    client: Client,
    config: OpenAiCompatConfig,
    models: Vec<String>,
}

impl OpenAiCompatProvider {
    /// Create a new provider serving the given models
    #[must_use]
    pub fn new(config: OpenAiCompatConfig, models: Vec<String>) -> Self {
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
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.label
    }

    fn supported_models(&self) -> Vec<String> {
        self.models.clone()
    }

    #[instrument(skip(self, prompt), fields(provider = %self.config.label))]
    async fn invoke(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![WireMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: Some(max_tokens),
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(sanitize_api_error(&e.to_string()))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimit);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "{} returned {}: {}",
                self.config.label,
                status,
                sanitize_api_error(&body)
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::InvalidResponse(format!(
                "model {model} returned an empty completion"
            )));
        }

        debug!(model = %model, chars = text.len(), "Completion received");
        Ok(text)
    }
}
