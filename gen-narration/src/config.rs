//! gen-narration configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_KEYWORD: &str = "장영실";
const DEFAULT_LANGUAGE: &str = "ko";
const DEFAULT_PROVIDER: &str = "ollama";
const DEFAULT_MODEL: &str = "gpt-oss:latest";
const DEFAULT_SAMPLE_RATE: u32 = 24_000;
const DEFAULT_SILENCE_MS: u32 = 250;

/// Longest narration a run may ask for.
pub const MAX_DURATION_MINUTES: u32 = 180;

/// Placeholder replaced by the run's keyword in output filename templates.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Topic to look up and narrate
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Wikipedia language code (ko, en, ja, ...)
    #[serde(default = "default_language")]
    pub language: String,

    /// LLM provider (ollama, openai)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Target narration length in minutes
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    /// Sampling temperature for script generation (provider default if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Completion length cap in tokens (provider default if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Summary truncation bound, in characters
    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,

    /// Output PCM sample rate
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Silence appended after each sentence, in milliseconds
    #[serde(default = "default_silence_ms")]
    pub silence_ms: u32,

    /// Directory receiving the script and audio files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Script filename template
    #[serde(default = "default_script_file")]
    pub script_file: String,

    /// Audio filename template
    #[serde(default = "default_audio_file")]
    pub audio_file: String,

    #[serde(default)]
    pub tts: TtsConfig,
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Backend to use (bark, command)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Voice preset (Bark history prompt such as "v2/ko_speaker_0")
    #[serde(default)]
    pub voice: Option<String>,

    /// Bark semantic-token temperature (0.05-2.0)
    #[serde(default = "default_temp")]
    pub text_temp: f32,

    /// Bark waveform temperature (0.05-2.0)
    #[serde(default = "default_temp")]
    pub waveform_temp: f32,

    /// Program and arguments for the command backend; `{output}` is replaced
    /// by the WAV path the program must write.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Python virtualenv whose site-packages provides `bark`
    #[serde(default)]
    pub venv: Option<PathBuf>,
}

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_duration_minutes() -> u32 {
    10
}

fn default_max_summary_chars() -> usize {
    1500
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_silence_ms() -> u32 {
    DEFAULT_SILENCE_MS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_script_file() -> String {
    "{keyword}_script.txt".to_string()
}

fn default_audio_file() -> String {
    "{keyword}_audio_bark.wav".to_string()
}

fn default_backend() -> String {
    "bark".to_string()
}

fn default_temp() -> f32 {
    0.7
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            voice: None,
            text_temp: default_temp(),
            waveform_temp: default_temp(),
            command: None,
            venv: None,
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            language: default_language(),
            provider: default_provider(),
            model: default_model(),
            duration_minutes: default_duration_minutes(),
            temperature: None,
            max_tokens: None,
            max_summary_chars: default_max_summary_chars(),
            sample_rate: default_sample_rate(),
            silence_ms: default_silence_ms(),
            output_dir: default_output_dir(),
            script_file: default_script_file(),
            audio_file: default_audio_file(),
            tts: TtsConfig::default(),
        }
    }
}

impl NarrationConfig {
    /// Get the config file path: ~/.config/cli-programs/gen-narration.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("gen-narration.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NarrationConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Where the cleaned script is written.
    pub fn script_path(&self) -> PathBuf {
        self.output_dir
            .join(expand_template(&self.script_file, &self.keyword))
    }

    /// Where the final WAV is written.
    pub fn audio_path(&self) -> PathBuf {
        self.output_dir
            .join(expand_template(&self.audio_file, &self.keyword))
    }

    /// Approximate script length asked of the model, in characters.
    pub fn target_length(&self) -> u64 {
        crate::script::target_length(self.duration_minutes)
    }

    /// Reject settings a run cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            anyhow::bail!("Keyword is empty. Pass one on the command line or set it in the config.");
        }
        if self.duration_minutes == 0 || self.duration_minutes > MAX_DURATION_MINUTES {
            anyhow::bail!(
                "Duration must be between 1 and {} minutes, got {}",
                MAX_DURATION_MINUTES,
                self.duration_minutes
            );
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                anyhow::bail!("Temperature must be between 0.0 and 2.0, got {}", temperature);
            }
        }
        Ok(())
    }
}

/// Interpolate the keyword into a filename template.
///
/// Path separators in the keyword are replaced so the file stays inside the
/// output directory.
fn expand_template(template: &str, keyword: &str) -> String {
    let keyword = keyword.trim().replace(['/', '\\'], "_");
    template.replace(KEYWORD_PLACEHOLDER, &keyword)
}
