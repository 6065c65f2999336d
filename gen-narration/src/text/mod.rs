//! Text processing for TTS: script normalization and sentence splitting.

mod cleaner;
mod segmenter;

pub use cleaner::normalize_script;
pub use segmenter::split_sentences;
