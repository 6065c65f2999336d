//! Bark TTS backend using PyO3 to embed Python.
//!
//! Bark (Suno) keeps its models in module-level globals: `preload_models()`
//! loads them once and every later `generate_audio` call reuses them. Output is
//! float audio at a fixed 24 kHz, converted here to 16-bit PCM.

use super::{TtsBackend, TtsError, TtsOptions};
use crate::audio::f32_to_i16;
use async_trait::async_trait;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

/// Bark's native output rate.
pub const BARK_SAMPLE_RATE: u32 = 24_000;

/// Initialize Python runtime once.
static PYTHON_INIT: Once = Once::new();

/// Bark TTS backend. The models live in the embedded interpreter.
pub struct BarkBackend;

impl BarkBackend {
    /// Initialize Python and load Bark's models.
    ///
    /// Blocks for as long as the weights take to download and load.
    pub fn load(venv: Option<&Path>) -> Result<Self, TtsError> {
        let site_packages = venv.map(find_site_packages).transpose()?;

        PYTHON_INIT.call_once(|| {
            pyo3::prepare_freethreaded_python();
        });

        Python::with_gil(|py| -> PyResult<()> {
            if let Some(site_packages) = &site_packages {
                let sys = py.import("sys")?;
                let path = sys.getattr("path")?;
                path.call_method1("insert", (0, site_packages.to_string_lossy().as_ref()))?;
            }

            let generation = py.import("bark.generation")?;
            generation.call_method0("preload_models")?;
            Ok(())
        })
        .map_err(|e| TtsError::ModelLoad {
            backend: "bark",
            message: e.to_string(),
        })?;

        Ok(Self)
    }

    /// Generate one chunk through `bark.api.generate_audio`.
    fn generate_audio_sync(text: &str, options: &TtsOptions) -> Result<Vec<i16>, TtsError> {
        let samples: Vec<f32> = Python::with_gil(|py| -> PyResult<Vec<f32>> {
            let api = py.import("bark.api")?;

            let kwargs = PyDict::new(py);
            if let Some(voice) = &options.voice {
                kwargs.set_item("history_prompt", voice)?;
            }
            kwargs.set_item("text_temp", options.text_temp)?;
            kwargs.set_item("waveform_temp", options.waveform_temp)?;
            kwargs.set_item("silent", true)?;

            let audio = api.call_method("generate_audio", (text,), Some(&kwargs))?;
            audio
                .call_method1("astype", ("float32",))?
                .call_method0("tolist")?
                .extract()
        })
        .map_err(|e| TtsError::Synthesis(e.to_string()))?;

        Ok(f32_to_i16(&samples))
    }
}

#[async_trait]
impl TtsBackend for BarkBackend {
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<i16>, TtsError> {
        let text = text.to_string();
        let options = options.clone();

        // Run in a blocking task to not block the tokio runtime
        tokio::task::spawn_blocking(move || Self::generate_audio_sync(&text, &options))
            .await
            .map_err(|e| TtsError::Synthesis(format!("Task join error: {}", e)))?
    }

    fn sample_rate(&self) -> u32 {
        BARK_SAMPLE_RATE
    }

    fn name(&self) -> &'static str {
        "bark"
    }
}

/// Locate `site-packages` inside a virtualenv.
///
/// Unix venvs use `lib/pythonX.Y/site-packages`, Windows venvs `Lib/site-packages`.
fn find_site_packages(venv: &Path) -> Result<PathBuf, TtsError> {
    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() {
        return Ok(windows);
    }

    let lib = venv.join("lib");
    if lib.is_dir() {
        for entry in fs::read_dir(&lib)? {
            let path = entry?.path().join("site-packages");
            let is_python = path
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|name| name.to_string_lossy().starts_with("python"));
            if is_python && path.is_dir() {
                return Ok(path);
            }
        }
    }

    Err(TtsError::ModelLoad {
        backend: "bark",
        message: format!("no site-packages found in {}", venv.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_site_packages_unix_layout() {
        let venv = tempfile::tempdir().unwrap();
        let expected = venv.path().join("lib/python3.11/site-packages");
        fs::create_dir_all(&expected).unwrap();

        assert_eq!(find_site_packages(venv.path()).unwrap(), expected);
    }

    #[test]
    fn test_find_site_packages_missing() {
        let venv = tempfile::tempdir().unwrap();
        let err = find_site_packages(venv.path()).unwrap_err();
        assert!(err.to_string().contains("site-packages"));
    }
}
