//! Mock chat provider for testing
//!
//! Returns queued results in FIFO order. An exhausted queue fails the call,
//! which makes fallback-chain behavior easy to script in tests.

use crate::error::{Error, Result};
use crate::provider::ChatProvider;

use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that replays queued results
pub struct MockProvider {
    name: String,
    responses: Mutex<VecDeque<Result<String>>>,
    invocations: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text.into()));
    }

    /// Queue a failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(Error::Api(message.into())));
    }

    /// Models invoked so far, in call order
    #[must_use]
    pub fn invocations(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls made against this provider
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait::async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_models(&self) -> Vec<String> {
        vec![format!("{}-model", self.name)]
    }

    async fn invoke(&self, model: &str, _prompt: &str, _max_tokens: u32) -> Result<String> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(model.to_string());

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::Api(format!("mock queue exhausted for {model}"))))
    }
}
