//! Mock TTS backend for tests.

use super::{TtsBackend, TtsError, TtsOptions};
use async_trait::async_trait;
use std::sync::Mutex;

/// Renders each chunk as `len(text)` samples of a chunk-specific value and
/// records the text it was asked to speak.
pub struct MockBackend {
    sample_rate: u32,
    /// Zero-based call index that fails, if any
    fail_on: Option<usize>,
    spoken: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fail_on: None,
            spoken: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `index`-th synthesis call.
    pub fn failing_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    /// Texts received so far, in call order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// The buffer this backend renders for the `index`-th chunk.
    pub fn render(index: usize, text: &str) -> Vec<i16> {
        vec![index as i16 + 1; text.chars().count()]
    }
}

#[async_trait]
impl TtsBackend for MockBackend {
    async fn synthesize(&self, text: &str, _options: &TtsOptions) -> Result<Vec<i16>, TtsError> {
        let mut spoken = self.spoken.lock().unwrap();
        let index = spoken.len();
        spoken.push(text.to_string());

        if self.fail_on == Some(index) {
            return Err(TtsError::Synthesis(format!("mock failure on chunk {}", index)));
        }

        Ok(Self::render(index, text))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
