//! End-to-end narration run: summary, script, cleanup, chunks, audio.

use crate::audio::{self, wav};
use crate::config::NarrationConfig;
use crate::error::PipelineError;
use crate::script;
use crate::text;
use crate::tts::{TtsBackend, TtsOptions};
use crate::wiki::SummarySource;
use indicatif::{ProgressBar, ProgressStyle};
use llm_client::LlmProvider;
use std::path::{Path, PathBuf};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub script_path: PathBuf,
    pub audio_path: PathBuf,
    pub chunk_count: usize,
    pub sample_count: usize,
    pub duration_secs: f64,
}

/// Run every stage in order, stopping at the first failure.
///
/// The backend must already be loaded. The script file is written before any
/// synthesis starts; the audio file only once every chunk has rendered.
pub async fn run(
    config: &NarrationConfig,
    source: &dyn SummarySource,
    llm: &dyn LlmProvider,
    tts: &dyn TtsBackend,
) -> Result<RunOutput, PipelineError> {
    let keyword = config.keyword.trim();

    log::info!("Looking up '{}' ({} Wikipedia)", keyword, config.language);
    let summary = source.summary(keyword).await?;
    if summary.trim().is_empty() {
        return Err(PipelineError::EmptySummary(keyword.to_string()));
    }
    log::debug!("Summary: {} chars", summary.chars().count());

    log::info!(
        "Generating a {}-minute script with {} ({})",
        config.duration_minutes,
        llm.name(),
        config.model
    );
    let request = script::script_request(config, keyword, &summary);
    let draft = script::generate_script(llm, request).await?;

    let cleaned = text::normalize_script(&draft);
    if cleaned.is_empty() {
        return Err(PipelineError::EmptyScript);
    }

    let script_path = config.script_path();
    write_script(&script_path, &cleaned).await?;
    log::info!("Script saved to {}", script_path.display());

    let chunks = text::split_sentences(&cleaned);
    if chunks.is_empty() {
        return Err(PipelineError::NoChunks);
    }

    log::info!("Synthesizing {} chunks with {}", chunks.len(), tts.name());
    let options = TtsOptions::from_config(&config.tts);
    let progress = progress_bar(chunks.len());
    let samples = audio::assemble(&chunks, tts, &options, config.silence_ms, |done, _| {
        progress.set_position(done as u64)
    })
    .await;
    match &samples {
        Ok(_) => progress.finish_and_clear(),
        Err(_) => progress.abandon(),
    }
    let samples = samples?;

    let audio_path = config.audio_path();
    let sample_rate = tts.sample_rate();
    wav::write_wav(&audio_path, &samples, sample_rate).map_err(|source| {
        PipelineError::AudioWrite {
            path: audio_path.clone(),
            source,
        }
    })?;
    log::info!("Audio saved to {}", audio_path.display());

    Ok(RunOutput {
        script_path,
        audio_path,
        chunk_count: chunks.len(),
        sample_count: samples.len(),
        duration_secs: samples.len() as f64 / f64::from(sample_rate),
    })
}

async fn write_script(path: &Path, script: &str) -> Result<(), PipelineError> {
    let write = async {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, script).await
    };

    write.await.map_err(|source| PipelineError::ScriptWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::assembler::silence_samples;
    use crate::tts::mock::MockBackend;
    use crate::wiki::WikiError;
    use async_trait::async_trait;
    use llm_client::{LlmError, MockProvider};

    struct FixedSummary(Result<String, ()>);

    #[async_trait]
    impl SummarySource for FixedSummary {
        async fn summary(&self, keyword: &str) -> Result<String, WikiError> {
            self.0
                .clone()
                .map_err(|_| WikiError::NotFound(keyword.to_string()))
        }
    }

    fn found(text: &str) -> FixedSummary {
        FixedSummary(Ok(text.to_string()))
    }

    fn config_in(dir: &Path) -> NarrationConfig {
        NarrationConfig {
            keyword: "Hangul".to_string(),
            output_dir: dir.to_path_buf(),
            silence_ms: 10,
            ..NarrationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_succeeds(
            "## Intro\nHello world. How are you? Fine! (stage direction)",
        );
        let tts = MockBackend::new(1_000);

        let output = run(&config, &found("An alphabet."), &llm, &tts)
            .await
            .unwrap();

        let script = std::fs::read_to_string(&output.script_path).unwrap();
        assert_eq!(script, "Intro Hello world. How are you? Fine!");
        assert_eq!(
            tts.spoken(),
            vec!["Intro Hello world.", "How are you?", "Fine!"]
        );

        let silence = silence_samples(10, 1_000);
        let speech: usize = tts.spoken().iter().map(|t| t.chars().count()).sum();
        assert_eq!(output.chunk_count, 3);
        assert_eq!(output.sample_count, speech + 3 * silence);

        let (samples, rate) = wav::read_wav(&output.audio_path).unwrap();
        assert_eq!(rate, 1_000);
        assert_eq!(samples.len(), output.sample_count);
        assert_eq!(output.audio_path, dir.path().join("Hangul_audio_bark.wav"));
        assert!((output.duration_secs - output.sample_count as f64 / 1_000.0).abs() < 1e-9);

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("An alphabet."));
        assert!(prompt.contains("### Topic: Hangul"));
    }

    #[tokio::test]
    async fn test_synthesis_failure_writes_no_audio() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_succeeds("One. Two. Three.");
        let tts = MockBackend::new(1_000).failing_on(1);

        let err = run(&config, &found("summary"), &llm, &tts)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Synthesis { index: 1, .. }));
        assert!(!config.audio_path().exists());
        // The script is written before synthesis.
        assert!(config.script_path().exists());
        assert_eq!(tts.spoken(), vec!["One.", "Two."]);
    }

    #[tokio::test]
    async fn test_lookup_failure_stops_before_generation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_succeeds("unused");
        let tts = MockBackend::new(1_000);

        let err = run(&config, &FixedSummary(Err(())), &llm, &tts)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Lookup(WikiError::NotFound(_))));
        assert_eq!(llm.call_count(), 0);
        assert!(!config.script_path().exists());
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_succeeds("unused");

        let err = run(&config, &found("  \n "), &llm, &MockBackend::new(1_000))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmptySummary(k) if k == "Hangul"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_fails(LlmError::EmptyCompletion);
        let tts = MockBackend::new(1_000);

        let err = run(&config, &found("summary"), &llm, &tts)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
        assert!(tts.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_script_of_only_markup_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let llm = MockProvider::always_succeeds("## \n(aside) [1]\n**");

        let err = run(&config, &found("summary"), &llm, &MockBackend::new(1_000))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmptyScript));
        assert!(!config.script_path().exists());
    }

    #[tokio::test]
    async fn test_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir.path().join("nested/out"));
        let llm = MockProvider::always_succeeds("Just one sentence");

        let output = run(&config, &found("summary"), &llm, &MockBackend::new(1_000))
            .await
            .unwrap();

        assert_eq!(output.chunk_count, 1);
        assert!(output.script_path.exists());
        assert!(output.audio_path.exists());
    }
}
