//! gen-narration - Turn an encyclopedia summary into a narrated audio file

mod audio;
mod config;
mod error;
mod pipeline;
mod script;
mod text;
mod tts;
mod wiki;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::NarrationConfig;
use error::PipelineError;
use llm_client::{Config as LlmConfig, ModelPreset};
use std::path::PathBuf;
use std::process::ExitCode;
use wiki::WikipediaClient;

#[derive(Parser, Debug)]
#[command(name = "gen-narration")]
#[command(about = "Generate a narrated audio file about a topic from its Wikipedia summary", long_about = None)]
#[command(version)]
struct Args {
    /// Topic to narrate (default from config)
    keyword: Option<String>,

    /// Model to generate the script with
    #[arg(short, long)]
    model: Option<String>,

    /// LLM provider (ollama, openai)
    #[arg(short, long)]
    provider: Option<String>,

    /// Wikipedia language code (ko, en, ja, ...)
    #[arg(short, long)]
    language: Option<String>,

    /// Target narration length in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Sampling temperature for script generation (0.0-2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Silence after each sentence, in milliseconds
    #[arg(long)]
    silence_ms: Option<u32>,

    /// Directory for the script and audio files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TTS backend (bark, command)
    #[arg(long)]
    backend: Option<String>,

    /// Voice preset (e.g. v2/ko_speaker_0)
    #[arg(long)]
    voice: Option<String>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default provider and model
    SetModel {
        /// Model identifier (e.g. gpt-oss:latest)
        model: String,
        /// Provider (ollama, openai)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Set default Wikipedia language
    SetLanguage {
        /// Language code
        language: String,
    },
    /// Set default voice preset
    SetVoice {
        /// Voice preset name
        voice: String,
    },
    /// Set default TTS backend
    SetBackend {
        /// Backend name (bark, command)
        backend: String,
    },
    /// Set silence between sentences
    SetSilence {
        /// Milliseconds
        ms: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if let Some(Commands::Config { action }) = &args.command {
        handle_config_command(action)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = NarrationConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);

    config.validate()?;

    log::debug!("Config file: {:?}", NarrationConfig::config_path()?);
    log::debug!("Keyword: {}", config.keyword);
    log::debug!("Model: {} ({})", config.model, config.provider);
    log::debug!("Target length: {} chars", config.target_length());
    log::debug!("Script: {}", config.script_path().display());
    log::debug!("Audio: {}", config.audio_path().display());

    // The speech model loads before any text is fetched or generated.
    log::info!("Loading {} TTS backend", config.tts.backend);
    let tts = match tts::create_backend(&config.tts, config.sample_rate).await {
        Ok(backend) => backend,
        Err(e) => return Ok(report(PipelineError::ModelLoad(e))),
    };

    let llm_config = LlmConfig::load().context("Failed to load LLM configuration")?;
    let preset = ModelPreset::new(&config.provider, &config.model);
    let llm = llm_client::get_provider(&preset, llm_config.get_provider_config(&config.provider))
        .with_context(|| format!("Failed to set up {} provider", config.provider))?;

    let source = WikipediaClient::new(&config.language, config.max_summary_chars)
        .context("Failed to set up Wikipedia client")?;

    match pipeline::run(&config, &source, llm.as_ref(), tts.as_ref()).await {
        Ok(output) => {
            eprintln!("Script: {}", output.script_path.display());
            eprintln!(
                "Audio: {} ({} sentences, {} samples, {:.1}s)",
                output.audio_path.display(),
                output.chunk_count,
                output.sample_count,
                output.duration_secs
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(e)),
    }
}

fn report(err: PipelineError) -> ExitCode {
    log::error!("[{}] {}", err.stage(), err);
    ExitCode::FAILURE
}

fn apply_overrides(config: &mut NarrationConfig, args: &Args) {
    if let Some(keyword) = &args.keyword {
        config.keyword = keyword.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(provider) = &args.provider {
        config.provider = provider.clone();
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(duration) = args.duration {
        config.duration_minutes = duration;
    }
    if let Some(temperature) = args.temperature {
        config.temperature = Some(temperature);
    }
    if let Some(silence_ms) = args.silence_ms {
        config.silence_ms = silence_ms;
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(backend) = &args.backend {
        config.tts.backend = backend.clone();
    }
    if let Some(voice) = &args.voice {
        config.tts.voice = Some(voice.clone());
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrationConfig::load()?;
            println!("Configuration file: {:?}", NarrationConfig::config_path()?);
            println!();
            println!("keyword = \"{}\"", config.keyword);
            println!("language = \"{}\"", config.language);
            println!("provider = \"{}\"", config.provider);
            println!("model = \"{}\"", config.model);
            println!("duration_minutes = {}", config.duration_minutes);
            if let Some(temperature) = config.temperature {
                println!("temperature = {}", temperature);
            }
            if let Some(max_tokens) = config.max_tokens {
                println!("max_tokens = {}", max_tokens);
            }
            println!("max_summary_chars = {}", config.max_summary_chars);
            println!("sample_rate = {}", config.sample_rate);
            println!("silence_ms = {}", config.silence_ms);
            println!("output_dir = \"{}\"", config.output_dir.display());
            println!("script_file = \"{}\"", config.script_file);
            println!("audio_file = \"{}\"", config.audio_file);
            println!();
            println!("[tts]");
            println!("backend = \"{}\"", config.tts.backend);
            match &config.tts.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (backend default)"),
            }
            println!("text_temp = {}", config.tts.text_temp);
            println!("waveform_temp = {}", config.tts.waveform_temp);
            if let Some(command) = &config.tts.command {
                println!("command = {:?}", command);
            }
            if let Some(venv) = &config.tts.venv {
                println!("venv = \"{}\"", venv.display());
            }
        }
        ConfigAction::SetModel { model, provider } => {
            let mut config = NarrationConfig::load()?;
            if let Some(provider) = provider {
                llm_client::ProviderKind::from_str(provider)?;
                config.provider = provider.clone();
            }
            config.model = model.clone();
            config.save()?;
            println!("Default model set to: {} ({})", config.model, config.provider);
        }
        ConfigAction::SetLanguage { language } => {
            let mut config = NarrationConfig::load()?;
            config.language = language.clone();
            config.save()?;
            println!("Default language set to: {}", config.language);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrationConfig::load()?;
            config.tts.voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetBackend { backend } => {
            tts::BackendKind::from_str(backend)?;
            let mut config = NarrationConfig::load()?;
            config.tts.backend = backend.to_lowercase();
            config.save()?;
            println!("Default TTS backend set to: {}", config.tts.backend);
        }
        ConfigAction::SetSilence { ms } => {
            let mut config = NarrationConfig::load()?;
            config.silence_ms = *ms;
            config.save()?;
            println!("Silence between sentences set to: {} ms", config.silence_ms);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from([
            "gen-narration",
            "Hangul",
            "--model",
            "llama3.2",
            "--language",
            "en",
            "--silence-ms",
            "400",
            "--temperature",
            "0.9",
            "--voice",
            "v2/en_speaker_6",
        ]);
        let mut config = NarrationConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.keyword, "Hangul");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.language, "en");
        assert_eq!(config.silence_ms, 400);
        assert_eq!(config.temperature, Some(0.9));
        assert_eq!(config.tts.voice.as_deref(), Some("v2/en_speaker_6"));
        assert_eq!(config.provider, "ollama");
    }

    #[test]
    fn test_no_args_keeps_config() {
        let args = Args::parse_from(["gen-narration"]);
        let mut config = NarrationConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.keyword, "장영실");
        assert!(args.command.is_none());
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let args = Args::parse_from(["gen-narration", "--duration", "20000000"]);
        let mut config = NarrationConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.duration_minutes, 20_000_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_subcommand_parses() {
        let args = Args::parse_from(["gen-narration", "config", "set-silence", "300"]);
        assert!(matches!(
            args.command,
            Some(Commands::Config {
                action: ConfigAction::SetSilence { ms: 300 }
            })
        ));
    }
}
