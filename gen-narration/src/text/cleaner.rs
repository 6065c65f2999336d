//! Script normalization: strip markdown artifacts left by the language model
//! and flatten the result into one clean paragraph for TTS.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s*").expect("valid regex"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_]{1,2}").expect("valid regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*]\s+").expect("valid regex"));
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").expect("valid regex"));
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a generated script for speech synthesis.
///
/// Passes run in a fixed order:
/// 1. heading markers (`## `)
/// 2. emphasis markers (`*`, `**`, `_`, `__`)
/// 3. list bullets at line start
/// 4. numbered-list markers at line start
/// 5. `(...)` and `[...]` asides, contents included
/// 6. non-whitespace control characters
/// 7. whitespace runs collapsed to one space, then trimmed
/// 8. any stray `\n` / `\r` replaced with a space
///
/// Never fails. An empty result means there is nothing to narrate.
pub fn normalize_script(text: &str) -> String {
    let text = HEADING.replace_all(text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "");
    let text = NUMBERED.replace_all(&text, "");
    let text = PARENTHETICAL.replace_all(&text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = strip_control_chars(&text);
    let text = WHITESPACE.replace_all(&text, " ");

    // Some TTS models derail on embedded line breaks; step 7 should already
    // have removed them.
    text.trim().replace(['\n', '\r'], " ")
}

/// Drop control characters other than whitespace, which the collapse pass handles.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}
