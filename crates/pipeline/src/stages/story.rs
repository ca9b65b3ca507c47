//! Story stage: expand the source text into a structured narrative.

use inkforge_core::generation::GenerationInput;
use inkforge_core::story::{SourceText, StoryOutline};
use inkforge_providers::text::{TextGenerator, TextRequest};

use crate::stage::{extract_json, StageError};

const SYSTEM: &str =
    "You are a comic book story editor. Respond with a single JSON document and nothing else.";

pub async fn run(
    text_gen: &dyn TextGenerator,
    input: &GenerationInput,
    source: &SourceText,
) -> Result<StoryOutline, StageError> {
    let request = TextRequest::new(outline_prompt(input, source)).with_system(SYSTEM);
    let raw = text_gen.generate(&request).await?;

    let outline: StoryOutline = serde_json::from_str(extract_json(&raw))
        .map_err(|e| StageError::generation(format!("Story outline was not valid JSON: {e}")))?;
    outline.validate()?;

    tracing::info!(
        scenes = outline.scenes.len(),
        characters = outline.characters.len(),
        "Story outline created",
    );
    Ok(outline)
}

/// Prompt asking for a structured outline sized to the requested pages.
fn outline_prompt(input: &GenerationInput, source: &SourceText) -> String {
    format!(
        "Write a story outline for a {pages}-page comic titled \"{title}\", \
         aimed at a {audience} audience.\n\
         Structure the narrative into exactly {pages} scenes.\n\
         Return a JSON object with keys: title (string), genre (string), \
         summary (string), themes (array of strings), characters (array of \
         objects with name, appearance, role), scenes (array of objects with \
         number, heading, synopsis). Scene numbers start at 1.\n\
         \n\
         Source material:\n{text}",
        pages = input.target_pages,
        title = input.title,
        audience = input.target_audience.as_str(),
        text = source.text,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
