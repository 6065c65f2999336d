//! Audio assembly: per-chunk buffers concatenated with silence, written as WAV.

pub mod assembler;
pub mod wav;

pub use assembler::assemble;

/// Convert float samples in [-1.0, 1.0] to 16-bit PCM, clamping out-of-range values.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}
