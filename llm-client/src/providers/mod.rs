//! LLM provider implementations

pub mod mock;
mod ollama;
mod openai_compatible;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAi,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "openai-compatible" | "openai_compatible" => Ok(Self::OpenAi),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Self::Ollama => None,
            Self::OpenAi => Some("OPENAI_API_KEY"),
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind = ProviderKind::from_str(&preset.provider)?;
    let base_url = provider_config.and_then(|c| c.base_url.clone());

    let provider: Box<dyn LlmProvider> = match kind {
        ProviderKind::Ollama => Box::new(OllamaProvider::new(&preset.model, base_url.as_deref())?),
        ProviderKind::OpenAi => {
            let base_url = base_url.ok_or_else(|| {
                LlmError::ConfigError(
                    "openai provider needs providers.openai.base_url in llm.toml".to_string(),
                )
            })?;
            let api_key = get_api_key(provider_config, kind.env_var());
            Box::new(OpenAICompatibleProvider::new(
                &preset.model,
                &base_url,
                api_key,
                "OpenAI-compatible",
            )?)
        }
    };

    provider.is_available()?;
    Ok(provider)
}

/// Get API key from config or environment variable
///
/// Local servers usually run without a key, so a missing key is not an error.
fn get_api_key(config: Option<&ProviderConfig>, env_var: Option<&str>) -> Option<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Some(key);
    }

    env_var.and_then(|var| std::env::var(var).ok())
}
