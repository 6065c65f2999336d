//! Sentence segmentation for per-sentence synthesis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Terminal punctuation followed by the whitespace that ends a sentence.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?!]\s+").expect("valid regex"));

/// Split normalized text into sentence-level chunks.
///
/// Breaks on whitespace that directly follows `.`, `?` or `!`; the punctuation
/// stays with the preceding chunk. Empty segments are dropped. Abbreviations
/// ("Dr. Kim") are split like any other sentence end.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_END.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        let end = boundary.start() + 1;
        push_chunk(&mut chunks, &text[start..end]);
        start = boundary.end();
    }
    push_chunk(&mut chunks, &text[start..]);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, segment: &str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        chunks.push(segment.to_string());
    }
}
