//! TTS backend trait and types.

#[cfg(feature = "bark")]
pub mod bark;
pub mod command;
#[cfg(test)]
pub mod mock;

use crate::audio::wav::WavError;
use crate::config::TtsConfig;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Unknown TTS backend: {0}")]
    UnknownBackend(String),

    #[error("Failed to load {backend} backend: {message}")]
    ModelLoad {
        backend: &'static str,
        message: String,
    },

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Backend produces {actual} Hz audio, expected {expected} Hz")]
    SampleRate { expected: u32, actual: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] WavError),
}

/// Options passed with every synthesis call.
#[derive(Debug, Clone)]
pub struct TtsOptions {
    /// Voice preset (Bark history prompt)
    pub voice: Option<String>,
    /// Semantic-token temperature (0.05-2.0, default 0.7)
    pub text_temp: f32,
    /// Waveform temperature (0.05-2.0, default 0.7)
    pub waveform_temp: f32,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            voice: None,
            text_temp: 0.7,
            waveform_temp: 0.7,
        }
    }
}

impl TtsOptions {
    /// Create new TTS options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from the saved configuration, clamping out-of-range values.
    pub fn from_config(config: &TtsConfig) -> Self {
        let options = Self::new()
            .with_text_temp(config.text_temp)
            .with_waveform_temp(config.waveform_temp);

        match &config.voice {
            Some(voice) => options.with_voice(voice.clone()),
            None => options,
        }
    }

    /// Set the voice preset.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set the semantic-token temperature.
    pub fn with_text_temp(mut self, temp: f32) -> Self {
        self.text_temp = temp.clamp(0.05, 2.0);
        self
    }

    /// Set the waveform temperature.
    pub fn with_waveform_temp(mut self, temp: f32) -> Self {
        self.waveform_temp = temp.clamp(0.05, 2.0);
        self
    }
}

/// TTS backend trait - all TTS engines implement this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Render one chunk of text to mono 16-bit samples at [`Self::sample_rate`].
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<i16>, TtsError>;

    /// Fixed output sample rate.
    fn sample_rate(&self) -> u32;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Bark,
    Command,
}

impl BackendKind {
    /// Parse backend kind from string
    pub fn from_str(s: &str) -> Result<Self, TtsError> {
        match s.to_lowercase().as_str() {
            "bark" => Ok(Self::Bark),
            "command" | "cmd" => Ok(Self::Command),
            _ => Err(TtsError::UnknownBackend(s.to_string())),
        }
    }
}

/// Create and load a TTS backend.
///
/// Model weights are loaded here, once, before any text is processed.
pub async fn create_backend(
    config: &TtsConfig,
    sample_rate: u32,
) -> Result<Box<dyn TtsBackend>, TtsError> {
    match BackendKind::from_str(&config.backend)? {
        BackendKind::Bark => load_bark(config, sample_rate).await,
        BackendKind::Command => {
            let argv = config.command.as_deref().unwrap_or_default();
            Ok(Box::new(command::CommandBackend::new(argv, sample_rate)?))
        }
    }
}

#[cfg(feature = "bark")]
async fn load_bark(config: &TtsConfig, sample_rate: u32) -> Result<Box<dyn TtsBackend>, TtsError> {
    if sample_rate != bark::BARK_SAMPLE_RATE {
        return Err(TtsError::SampleRate {
            expected: sample_rate,
            actual: bark::BARK_SAMPLE_RATE,
        });
    }

    let venv = config.venv.clone();
    let backend = tokio::task::spawn_blocking(move || bark::BarkBackend::load(venv.as_deref()))
        .await
        .map_err(|e| TtsError::ModelLoad {
            backend: "bark",
            message: format!("Task join error: {}", e),
        })??;

    Ok(Box::new(backend))
}

#[cfg(not(feature = "bark"))]
async fn load_bark(
    _config: &TtsConfig,
    _sample_rate: u32,
) -> Result<Box<dyn TtsBackend>, TtsError> {
    Err(TtsError::ModelLoad {
        backend: "bark",
        message: "this build has no Bark support; rebuild with `--features bark` \
                  or set tts.backend = \"command\""
            .to_string(),
    })
}
