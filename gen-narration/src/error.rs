//! Failure kinds of a narration run, one per pipeline stage.

use crate::audio::wav::WavError;
use crate::tts::TtsError;
use crate::wiki::WikiError;
use llm_client::LlmError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load speech model: {0}")]
    ModelLoad(#[source] TtsError),

    #[error("Encyclopedia lookup failed: {0}")]
    Lookup(#[from] WikiError),

    #[error("Encyclopedia summary for '{0}' is empty")]
    EmptySummary(String),

    #[error("Script generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Generated script is empty after cleanup")]
    EmptyScript,

    #[error("Failed to write script to {}: {source}", .path.display())]
    ScriptWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Script contains no sentences to synthesize")]
    NoChunks,

    #[error("Speech synthesis failed on chunk {}: {source}", .index + 1)]
    Synthesis { index: usize, source: TtsError },

    #[error("Failed to write audio to {}: {source}", .path.display())]
    AudioWrite { path: PathBuf, source: WavError },
}

impl PipelineError {
    /// Short stage label for log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ModelLoad(_) => "model-load",
            Self::Lookup(_) => "lookup",
            Self::EmptySummary(_) | Self::Generation(_) | Self::EmptyScript => "generation",
            Self::ScriptWrite { .. } | Self::AudioWrite { .. } => "output",
            Self::NoChunks => "segmentation",
            Self::Synthesis { .. } => "synthesis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_message_is_one_based() {
        let err = PipelineError::Synthesis {
            index: 1,
            source: TtsError::Synthesis("out of memory".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Speech synthesis failed on chunk 2: Synthesis failed: out of memory"
        );
        assert_eq!(err.stage(), "synthesis");
    }

    #[test]
    fn test_stages() {
        assert_eq!(PipelineError::NoChunks.stage(), "segmentation");
        assert_eq!(PipelineError::EmptyScript.stage(), "generation");
        assert_eq!(
            PipelineError::Lookup(WikiError::NotFound("x".to_string())).stage(),
            "lookup"
        );
    }
}
