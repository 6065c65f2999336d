//! Narration script generation from an encyclopedia summary.

use crate::config::NarrationConfig;
use llm_client::{LlmProvider, LlmRequest, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Characters of narration per minute of audio.
pub const CHARS_PER_MINUTE: u32 = 250;

const PROMPT_TEMPLATE: &str = "\
You are a knowledgeable history storyteller for an online video channel.
Using the topic and summary below, write a video narration script of about \
{duration_minutes} minutes (roughly {target_length} characters) that keeps \
the audience curious and engaged.

### Topic: {topic}
### Encyclopedia summary: {summary}

### Guidelines:
1. Opening: start with a question or a surprising fact that sparks curiosity.
2. Body: build on the summary and enrich the story with what you know.
3. Closing: wrap up cleanly and leave the listener with a lasting thought.
4. Tone: friendly and easy to follow, like telling a good old story to a friend.
5. Output: write only the words to be read aloud, in the same language as the summary.";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(topic|summary|duration_minutes|target_length)\}").expect("valid regex"));

/// Characters of narration asked for a `duration_minutes` script.
pub fn target_length(duration_minutes: u32) -> u64 {
    u64::from(duration_minutes) * u64::from(CHARS_PER_MINUTE)
}

/// Fill the narration prompt template.
///
/// All placeholders are replaced in one pass over the template, so text
/// inside the topic or summary is never expanded.
pub fn build_prompt(topic: &str, summary: &str, duration_minutes: u32) -> String {
    PLACEHOLDER
        .replace_all(PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "topic" => topic.to_string(),
            "summary" => summary.to_string(),
            "duration_minutes" => duration_minutes.to_string(),
            _ => target_length(duration_minutes).to_string(),
        })
        .into_owned()
}

/// The completion request for one run: the filled prompt plus the configured
/// sampling settings.
pub fn script_request(config: &NarrationConfig, topic: &str, summary: &str) -> LlmRequest {
    LlmRequest::user(build_prompt(topic, summary, config.duration_minutes))
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
}

/// Ask the model for a narration draft. The raw completion is returned
/// unmodified; cleanup happens in [`crate::text::normalize_script`].
pub async fn generate_script(llm: &dyn LlmProvider, request: LlmRequest) -> Result<String> {
    log::debug!("Prompt is {} chars", request.prompt.chars().count());

    let response = llm.complete(request).await?;

    if let Some(usage) = &response.usage {
        log::debug!(
            "{} ({}) used {} input / {} output tokens",
            llm.name(),
            response.model,
            usage.input_tokens,
            usage.output_tokens
        );
    }

    Ok(response.content)
}
