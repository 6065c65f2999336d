use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("API error{}: {message}", .status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, LlmError>;
