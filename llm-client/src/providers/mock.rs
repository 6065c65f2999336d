//! Mock LLM provider for testing
//!
//! Returns a canned completion or a canned failure and records every prompt it
//! receives, so callers can assert on the prompt they built.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider for exercising callers without a model server
pub struct MockProvider {
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return (None = always succeed)
    fail_with: Option<LlmError>,
    /// Response content to return on success
    success_response: String,
    /// Prompts received, in call order
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a provider that always fails with the given error
    pub fn always_fails(error: LlmError) -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            fail_with: Some(error),
            success_response: String::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always succeeds
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            fail_with: None,
            success_response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The prompt of the most recent request, if any
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .ok()
            .and_then(|prompts| prompts.last().cloned())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt);
        }

        if let Some(err) = &self.fail_with {
            return Err(clone_error(err));
        }

        Ok(LlmResponse {
            content: self.success_response.clone(),
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Clone an LlmError (needed because LlmError doesn't implement Clone)
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::ApiError {
            message,
            status_code,
        } => LlmError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        LlmError::ProviderUnavailable(s) => LlmError::ProviderUnavailable(s.clone()),
        LlmError::EmptyCompletion => LlmError::EmptyCompletion,
        LlmError::ConfigError(s) => LlmError::ConfigError(s.clone()),
        // For Io and Toml errors, we create a generic error since they can't be cloned
        LlmError::Io(_) => LlmError::ConfigError("IO error (mock)".to_string()),
        LlmError::TomlParse(_) => LlmError::ConfigError("TOML parse error (mock)".to_string()),
    }
}
