//! Script stage: decompose the narrative into an ordered panel sequence.
//!
//! Panel numbers must be contiguous starting at 1 and the page count must
//! match the request; violations are provider-output defects and fail the
//! stage rather than being silently repaired.

use inkforge_core::generation::{GenerationInput, PANELS_PER_PAGE};
use inkforge_core::script::ComicScript;
use inkforge_core::story::StoryOutline;
use inkforge_providers::text::{TextGenerator, TextRequest};

use crate::stage::{extract_json, StageError};

const SYSTEM: &str =
    "You are a comic book scriptwriter. Respond with a single JSON document and nothing else.";

pub async fn run(
    text_gen: &dyn TextGenerator,
    input: &GenerationInput,
    outline: &StoryOutline,
) -> Result<ComicScript, StageError> {
    let outline_json = serde_json::to_string(outline)
        .map_err(|e| StageError::generation(format!("Could not serialize outline: {e}")))?;

    let request = TextRequest::new(script_prompt(input, &outline_json)).with_system(SYSTEM);
    let raw = text_gen.generate(&request).await?;

    let script: ComicScript = serde_json::from_str(extract_json(&raw))
        .map_err(|e| StageError::generation(format!("Comic script was not valid JSON: {e}")))?;
    script.validate(input.target_pages)?;

    tracing::info!(
        panels = script.panel_count(),
        pages = script.total_pages,
        "Comic script created",
    );
    Ok(script)
}

/// Prompt asking for the panel breakdown of an outline.
fn script_prompt(input: &GenerationInput, outline_json: &str) -> String {
    format!(
        "Break the story into numbered comic panels: {pages} pages with up to \
         {per_page} panels per page.\n\
         Return a JSON object with keys: title (string), total_pages (must be \
         {pages}), panels (array of objects with number, page, description, \
         mood, camera_angle, characters). Panel numbers are contiguous \
         starting at 1; every panel's page is between 1 and {pages}. \
         Descriptions are visual instructions for an illustrator working in \
         the {style} style.\n\
         \n\
         Story outline:\n{outline_json}",
        pages = input.target_pages,
        per_page = PANELS_PER_PAGE,
        style = input.art_style.as_str(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inkforge_core::generation::{ArtStyle, Audience, OutputFormat, SourceMaterial};
    use inkforge_core::job::ErrorKind;
    use inkforge_core::story::SceneOutline;
    use inkforge_providers::error::ProviderError;

    struct CannedText(String);

    #[async_trait]
    impl TextGenerator for CannedText {
        async fn generate(&self, _request: &TextRequest) -> Result<String, ProviderError> {
            Ok(self.0.clone())
        }
    }

    fn input() -> GenerationInput {
        GenerationInput {
            title: "Test".to_string(),
            source: SourceMaterial::Text {
                text: "story".to_string(),
            },
            art_style: ArtStyle::Manga,
            target_pages: 1,
            target_audience: Audience::General,
            output_formats: vec![OutputFormat::Pdf],
        }
    }

    fn outline() -> StoryOutline {
        StoryOutline {
            title: "Test".to_string(),
            genre: "adventure".to_string(),
            summary: "A hero sets out.".to_string(),
            themes: vec![],
            characters: vec![],
            scenes: vec![SceneOutline {
                number: 1,
                heading: "Departure".to_string(),
                synopsis: "Ava leaves.".to_string(),
            }],
        }
    }

    const VALID_SCRIPT: &str = r#"{
        "title": "Test",
        "total_pages": 1,
        "panels": [
            {"number": 1, "page": 1, "description": "Ava at the door", "mood": "hopeful"},
            {"number": 2, "page": 1, "description": "Ava on the road", "mood": "determined"}
        ]
    }"#;

    #[tokio::test]
    async fn parses_valid_script() {
        let script = run(&CannedText(VALID_SCRIPT.to_string()), &input(), &outline())
            .await
            .unwrap();
        assert_eq!(script.panel_count(), 2);
    }

    #[tokio::test]
    async fn non_contiguous_panels_fail_the_stage() {
        let bad = r#"{
            "title": "Test",
            "total_pages": 1,
            "panels": [
                {"number": 1, "page": 1, "description": "a", "mood": "m"},
                {"number": 3, "page": 1, "description": "b", "mood": "m"}
            ]
        }"#;
        let err = run(&CannedText(bad.to_string()), &input(), &outline())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Generation);
        assert!(err.message.contains("contiguous"));
    }

    #[tokio::test]
    async fn wrong_page_count_fails_the_stage() {
        let bad = r#"{
            "title": "Test",
            "total_pages": 3,
            "panels": [{"number": 1, "page": 1, "description": "a", "mood": "m"}]
        }"#;
        let err = run(&CannedText(bad.to_string()), &input(), &outline())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Generation);
    }

    #[test]
    fn prompt_embeds_outline_and_style() {
        let prompt = script_prompt(&input(), "{\"summary\":\"s\"}");
        assert!(prompt.contains("numbered comic panels"));
        assert!(prompt.contains("manga style"));
        assert!(prompt.contains("{\"summary\":\"s\"}"));
    }
}
