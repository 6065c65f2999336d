//! Shared LLM client library for the gen-narration workspace
//!
//! Provides a unified interface for chat-completion backends:
//! - Ollama (local models over the `/api/chat` endpoint)
//! - OpenAI-compatible servers (llama.cpp, LM Studio, vLLM, hosted APIs)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, ProviderKind, get_provider};
