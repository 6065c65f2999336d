//! External-program TTS backend.
//!
//! Runs a command-line synthesizer such as Piper once per chunk: the chunk text
//! is written to the program's stdin and the program writes a WAV file to the
//! path substituted for `{output}` in its arguments.

use super::{TtsBackend, TtsError, TtsOptions};
use crate::audio::wav;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Placeholder replaced by the temporary WAV path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// TTS backend that shells out to an external synthesizer.
#[derive(Debug)]
pub struct CommandBackend {
    /// Resolved program path
    program: PathBuf,
    /// Argument templates
    args: Vec<String>,
    /// Rate the program is expected to produce
    sample_rate: u32,
}

impl CommandBackend {
    /// Create a command backend from an argv list.
    ///
    /// Fails if the list is empty, the program is not on `PATH`, or no argument
    /// carries the `{output}` placeholder.
    pub fn new(argv: &[String], sample_rate: u32) -> Result<Self, TtsError> {
        let (program, args) = argv.split_first().ok_or_else(|| TtsError::ModelLoad {
            backend: "command",
            message: "tts.command is not set".to_string(),
        })?;

        if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            return Err(TtsError::ModelLoad {
                backend: "command",
                message: format!("tts.command must contain an {} argument", OUTPUT_PLACEHOLDER),
            });
        }

        let program = which::which(program).map_err(|e| TtsError::ModelLoad {
            backend: "command",
            message: format!("{}: {}", program, e),
        })?;

        Ok(Self {
            program,
            args: args.to_vec(),
            sample_rate,
        })
    }

    fn expand_args(&self, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(OUTPUT_PLACEHOLDER, output))
            .collect()
    }
}

#[async_trait]
impl TtsBackend for CommandBackend {
    async fn synthesize(&self, text: &str, _options: &TtsOptions) -> Result<Vec<i16>, TtsError> {
        let temp_dir = tempfile::tempdir()?;
        let output_path = temp_dir.path().join("chunk.wav");
        let args = self.expand_args(&output_path.to_string_lossy());

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits early closes the pipe; its exit status says why.
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TtsError::Synthesis(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let (samples, rate) = wav::read_wav(&output_path)?;
        if rate != self.sample_rate {
            return Err(TtsError::SampleRate {
                expected: self.sample_rate,
                actual: rate,
            });
        }

        Ok(samples)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = CommandBackend::new(&[], 24_000).unwrap_err();
        assert!(err.to_string().contains("tts.command"));
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let err = CommandBackend::new(&argv(&["sh", "-c", "true"]), 24_000).unwrap_err();
        assert!(err.to_string().contains("{output}"));
    }

    #[test]
    fn test_missing_program_rejected() {
        let err = CommandBackend::new(
            &argv(&["definitely-not-a-tts-binary", "{output}"]),
            24_000,
        )
        .unwrap_err();
        assert!(matches!(err, TtsError::ModelLoad { backend: "command", .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_args() {
        let backend =
            CommandBackend::new(&argv(&["sh", "--output_file", "{output}"]), 22_050).unwrap();
        assert_eq!(
            backend.expand_args("/tmp/x.wav"),
            vec!["--output_file", "/tmp/x.wav"]
        );
        assert_eq!(backend.sample_rate(), 22_050);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_is_synthesis_error() {
        let script = "cat > /dev/null; echo boom >&2; exit 3";
        let backend =
            CommandBackend::new(&argv(&["sh", "-c", script, "{output}"]), 24_000).unwrap();
        let err = backend
            .synthesize("Hello.", &TtsOptions::default())
            .await
            .unwrap_err();
        match err {
            TtsError::Synthesis(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_output_read_back() {
        // Copies a prepared WAV to the requested output path, ignoring stdin text.
        let fixture_dir = tempfile::tempdir().unwrap();
        let fixture = fixture_dir.path().join("fixture.wav");
        wav::write_wav(&fixture, &[1, -2, 3, -4], 16_000).unwrap();

        let script = format!("cat > /dev/null; cp '{}' \"$0\"", fixture.display());
        let backend =
            CommandBackend::new(&argv(&["sh", "-c", &script, "{output}"]), 16_000).unwrap();

        let samples = backend
            .synthesize("Hello there.", &TtsOptions::default())
            .await
            .unwrap();
        assert_eq!(samples, vec![1, -2, 3, -4]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sample_rate_mismatch() {
        let fixture_dir = tempfile::tempdir().unwrap();
        let fixture = fixture_dir.path().join("fixture.wav");
        wav::write_wav(&fixture, &[0; 8], 16_000).unwrap();

        let script = format!("cat > /dev/null; cp '{}' \"$0\"", fixture.display());
        let backend =
            CommandBackend::new(&argv(&["sh", "-c", &script, "{output}"]), 24_000).unwrap();

        let err = backend
            .synthesize("Hi.", &TtsOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TtsError::SampleRate {
                expected: 24_000,
                actual: 16_000
            }
        ));
    }
}
