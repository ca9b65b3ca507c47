//! Text stage: captions and dialogue for every panel, in one batched call.
//!
//! The batch must come back with exactly the script's panel numbers; a
//! count or association mismatch is a generation error. Overlong captions
//! are clamped to the word bound instead of failing the job.

use inkforge_core::generation::{GenerationInput, CAPTION_MAX_WORDS};
use inkforge_core::script::{validate_panel_texts, ComicScript, PanelText};
use inkforge_providers::text::{TextGenerator, TextRequest};

use crate::stage::{extract_json, StageError};

const SYSTEM: &str =
    "You are a comic book letterer. Respond with a single JSON array and nothing else.";

pub async fn run(
    text_gen: &dyn TextGenerator,
    input: &GenerationInput,
    script: &ComicScript,
) -> Result<Vec<PanelText>, StageError> {
    let script_json = serde_json::to_string(&script.panels)
        .map_err(|e| StageError::generation(format!("Could not serialize panels: {e}")))?;

    let request = TextRequest::new(panel_text_prompt(input, script, &script_json)).with_system(SYSTEM);
    let raw = text_gen.generate(&request).await?;

    let mut texts: Vec<PanelText> = serde_json::from_str(extract_json(&raw))
        .map_err(|e| StageError::generation(format!("Panel text was not valid JSON: {e}")))?;

    // Re-associate by panel number before validating against the script.
    texts.sort_by_key(|t| t.panel);
    validate_panel_texts(&texts, script)?;

    for text in &mut texts {
        text.truncate_caption(CAPTION_MAX_WORDS);
    }

    tracing::info!(panels = texts.len(), "Captions and dialogue written");
    Ok(texts)
}

/// Prompt asking for captions and dialogue for the whole panel set.
fn panel_text_prompt(input: &GenerationInput, script: &ComicScript, script_json: &str) -> String {
    format!(
        "Write captions and dialogue for all {count} panels below, for a \
         {audience} audience.\n\
         Return a JSON array with exactly one object per panel, keyed by the \
         same panel numbers: {{\"panel\": number, \"caption\": string or null, \
         \"dialogue\": [{{\"speaker\": string, \"line\": string}}]}}.\n\
         Captions are at most {max_words} words. A panel may have an empty \
         dialogue array, a null caption, or both.\n\
         \n\
         Panels:\n{script_json}",
        count = script.panel_count(),
        audience = input.target_audience.as_str(),
        max_words = CAPTION_MAX_WORDS,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
