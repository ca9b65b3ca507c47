//! Ingest and story-stage payloads.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Ingest output
// ---------------------------------------------------------------------------

/// Extracted, validated source text produced by the ingest stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceText {
    pub text: String,
    pub word_count: usize,
}

impl SourceText {
    /// Build from already-trimmed text, computing the word count.
    pub fn from_text(text: String) -> Self {
        let word_count = text.split_whitespace().count();
        Self { text, word_count }
    }
}

// ---------------------------------------------------------------------------
// Story outline
// ---------------------------------------------------------------------------

/// A named character in the story, carried through to prompts so artwork
/// and dialogue stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub appearance: String,
    /// Role in the story: protagonist, antagonist, supporting.
    pub role: String,
}

/// One scene of the structured narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneOutline {
    pub number: u32,
    pub heading: String,
    pub synopsis: String,
}

/// Structured narrative produced by the story stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryOutline {
    pub title: String,
    pub genre: String,
    pub summary: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
    pub scenes: Vec<SceneOutline>,
}

impl StoryOutline {
    /// Validate the shape the story stage requires before handing the
    /// outline downstream.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.summary.trim().is_empty() {
            return Err(CoreError::Validation(
                "Story outline has an empty summary".to_string(),
            ));
        }
        if self.scenes.is_empty() {
            return Err(CoreError::Validation(
                "Story outline has no scenes".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
