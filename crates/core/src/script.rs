//! Script and text-stage payloads: panels, captions, and dialogue.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::generation::PANELS_PER_PAGE;

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// One scripted panel: what the artist should draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    /// 1-based panel number; contiguous across the whole script.
    pub number: u32,
    /// 1-based page the panel belongs to.
    pub page: u32,
    /// Visual description for the image generator.
    pub description: String,
    /// Mood/atmosphere hint.
    pub mood: String,
    /// Camera angle hint (close-up, medium, wide).
    #[serde(default)]
    pub camera_angle: Option<String>,
    /// Characters present in the panel.
    #[serde(default)]
    pub characters: Vec<String>,
}

/// Ordered panel breakdown produced by the script stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicScript {
    pub title: String,
    pub total_pages: u32,
    pub panels: Vec<Panel>,
}

impl ComicScript {
    pub fn panel_count(&self) -> u32 {
        self.panels.len() as u32
    }

    /// Validate the script shape against the requested page count.
    ///
    /// Panel numbers must be contiguous starting at 1; every panel's page
    /// must be within `1..=total_pages`; the panel count is bounded by
    /// `total_pages * PANELS_PER_PAGE`. Violations are provider-output
    /// defects and fail the stage rather than being silently repaired.
    pub fn validate(&self, target_pages: u32) -> Result<(), CoreError> {
        if self.total_pages != target_pages {
            return Err(CoreError::Validation(format!(
                "Script declares {} pages, request asked for {target_pages}",
                self.total_pages
            )));
        }
        if self.panels.is_empty() {
            return Err(CoreError::Validation(
                "Script contains no panels".to_string(),
            ));
        }
        let max_panels = target_pages * PANELS_PER_PAGE;
        if self.panel_count() > max_panels {
            return Err(CoreError::Validation(format!(
                "Script contains {} panels, maximum for {target_pages} pages is {max_panels}",
                self.panel_count()
            )));
        }
        for (i, panel) in self.panels.iter().enumerate() {
            let expected = i as u32 + 1;
            if panel.number != expected {
                return Err(CoreError::Validation(format!(
                    "Panel numbers must be contiguous from 1; position {i} has number {}",
                    panel.number
                )));
            }
            if panel.page < 1 || panel.page > self.total_pages {
                return Err(CoreError::Validation(format!(
                    "Panel {} is on page {}, outside 1..={}",
                    panel.number, panel.page, self.total_pages
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Captions and dialogue
// ---------------------------------------------------------------------------

/// One attributed line of dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

/// Caption and dialogue for a single panel, produced by the text stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelText {
    /// Panel number this text belongs to.
    pub panel: u32,
    /// Narrative caption, if any.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
}

impl PanelText {
    /// Clamp the caption to at most `max_words` words.
    ///
    /// Overlong captions are a soft provider defect: the text is kept but
    /// cut at the bound instead of failing the whole job.
    pub fn truncate_caption(&mut self, max_words: usize) {
        if let Some(caption) = &self.caption {
            let words: Vec<&str> = caption.split_whitespace().collect();
            if words.len() > max_words {
                self.caption = Some(words[..max_words].join(" "));
            }
        }
    }
}

/// Check that a batch of panel texts matches the script's panel set exactly
/// (same count, same numbers, ascending order after sorting).
pub fn validate_panel_texts(texts: &[PanelText], script: &ComicScript) -> Result<(), CoreError> {
    if texts.len() != script.panels.len() {
        return Err(CoreError::Validation(format!(
            "Got text for {} panels, script has {}",
            texts.len(),
            script.panels.len()
        )));
    }
    for (text, panel) in texts.iter().zip(script.panels.iter()) {
        if text.panel != panel.number {
            return Err(CoreError::Validation(format!(
                "Panel text numbering mismatch: got {}, expected {}",
                text.panel, panel.number
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
