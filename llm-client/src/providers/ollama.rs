//! Ollama provider
//!
//! Talks to a local (or remote) Ollama server through its native chat endpoint
//! with streaming disabled, so one request yields one complete message.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Provider for the Ollama `/api/chat` endpoint
pub struct OllamaProvider {
    model: String,
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider, defaulting to `http://localhost:11434`
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let client = Client::new();

        Ok(Self {
            model: model.to_string(),
            base_url: base_url
                .unwrap_or(OLLAMA_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    fn build_request(&self, request: &LlmRequest) -> ChatRequest {
        let messages = vec![Message {
            role: "user".to_string(),
            content: request.prompt.clone(),
        }];

        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

// Ollama API request/response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Default, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    message: Message,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl From<ChatResponse> for LlmResponse {
    fn from(response: ChatResponse) -> Self {
        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (input, output) => Some(TokenUsage {
                input_tokens: input.unwrap_or(0),
                output_tokens: output.unwrap_or(0),
            }),
        };

        LlmResponse {
            content: response.message.content,
            model: response.model,
            usage,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let chat_request = self.build_request(&request);
        let url = format!("{}/api/chat", self.base_url);

        log::debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ProviderUnavailable(format!(
                        "cannot reach Ollama at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    LlmError::ApiError {
                        message: format!("Request failed: {}", e),
                        status_code: None,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error
                } else {
                    error_text
                };

            return Err(LlmError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| LlmError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        let response = LlmResponse::from(chat_response);
        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn is_available(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|e| LlmError::ConfigError(format!("Invalid Ollama URL {}: {}", self.base_url, e)))
    }
}
