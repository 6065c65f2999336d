//! Sequential synthesis and concatenation of sentence chunks.

use crate::error::PipelineError;
use crate::tts::{TtsBackend, TtsOptions};

/// Number of samples in a `silence_ms` gap at `sample_rate`, rounded down.
pub fn silence_samples(silence_ms: u32, sample_rate: u32) -> usize {
    (u64::from(silence_ms) * u64::from(sample_rate) / 1000) as usize
}

/// Running concatenation of chunk audio, each chunk followed by the same gap.
#[derive(Debug)]
pub struct AudioAccumulator {
    samples: Vec<i16>,
    silence: Vec<i16>,
    chunks: usize,
}

impl AudioAccumulator {
    /// Create an empty accumulator that appends `silence_len` zero samples after
    /// every chunk.
    pub fn new(silence_len: usize) -> Self {
        Self {
            samples: Vec::new(),
            silence: vec![0; silence_len],
            chunks: 0,
        }
    }

    /// Append one chunk's audio followed by the silence gap.
    pub fn push_chunk(&mut self, audio: &[i16]) {
        self.samples.extend_from_slice(audio);
        self.samples.extend_from_slice(&self.silence);
        self.chunks += 1;
    }

    pub fn into_samples(self) -> Vec<i16> {
        log::debug!("Assembled {} chunks, {} samples", self.chunks, self.samples.len());
        self.samples
    }
}

/// Synthesize every chunk in order and concatenate the results.
///
/// Chunks are rendered one at a time; `on_progress(done, total)` runs after
/// each. The first synthesis failure aborts the whole assembly and the audio
/// gathered so far is dropped.
pub async fn assemble<F>(
    chunks: &[String],
    backend: &dyn TtsBackend,
    options: &TtsOptions,
    silence_ms: u32,
    mut on_progress: F,
) -> Result<Vec<i16>, PipelineError>
where
    F: FnMut(usize, usize),
{
    let silence_len = silence_samples(silence_ms, backend.sample_rate());
    let mut accumulator = AudioAccumulator::new(silence_len);

    for (index, chunk) in chunks.iter().enumerate() {
        log::debug!("Chunk {}/{}: {}", index + 1, chunks.len(), chunk);

        let audio = backend
            .synthesize(chunk, options)
            .await
            .map_err(|source| PipelineError::Synthesis { index, source })?;

        accumulator.push_chunk(&audio);
        on_progress(index + 1, chunks.len());
    }

    Ok(accumulator.into_samples())
}
