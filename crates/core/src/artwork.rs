//! Visual and video stage payloads, plus the assembled book composite.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::generation::{ArtStyle, Audience};
use crate::script::{ComicScript, PanelText};

// ---------------------------------------------------------------------------
// Artwork
// ---------------------------------------------------------------------------

/// Generated artwork for one panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelArt {
    pub panel: u32,
    /// Provider URL of the generated image.
    pub image_url: String,
    /// The prompt the image was generated from.
    pub prompt: String,
}

/// Complete artwork for a script, one image per panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtworkSet {
    pub panels: Vec<PanelArt>,
}

impl ArtworkSet {
    /// Restore ascending panel order regardless of completion order.
    pub fn sort_by_panel(&mut self) {
        self.panels.sort_by_key(|p| p.panel);
    }

    /// Check the set covers the script exactly: one image per panel, in
    /// ascending panel order. A gap means an upstream contract violation.
    pub fn validate_against(&self, script: &ComicScript) -> Result<(), CoreError> {
        if self.panels.len() != script.panels.len() {
            return Err(CoreError::Validation(format!(
                "Artwork covers {} panels, script has {}",
                self.panels.len(),
                script.panels.len()
            )));
        }
        for (art, panel) in self.panels.iter().zip(script.panels.iter()) {
            if art.panel != panel.number {
                return Err(CoreError::Validation(format!(
                    "Missing artwork for panel {}; found panel {} instead",
                    panel.number, art.panel
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Video clips
// ---------------------------------------------------------------------------

/// Animated clip for one panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelClip {
    pub panel: u32,
    pub video_url: String,
    pub duration_secs: f64,
}

/// Complete clip set for a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSet {
    pub clips: Vec<PanelClip>,
}

impl ClipSet {
    pub fn sort_by_panel(&mut self) {
        self.clips.sort_by_key(|c| c.panel);
    }

    pub fn validate_against(&self, script: &ComicScript) -> Result<(), CoreError> {
        if self.clips.len() != script.panels.len() {
            return Err(CoreError::Validation(format!(
                "Clips cover {} panels, script has {}",
                self.clips.len(),
                script.panels.len()
            )));
        }
        for (clip, panel) in self.clips.iter().zip(script.panels.iter()) {
            if clip.panel != panel.number {
                return Err(CoreError::Validation(format!(
                    "Missing clip for panel {}; found panel {} instead",
                    panel.number, clip.panel
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Assembled book
// ---------------------------------------------------------------------------

/// Everything the export sink needs to materialize one output format.
///
/// Built by the assembly stage after all per-panel inputs have been
/// verified complete and re-ordered.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledBook {
    pub job_id: Uuid,
    pub title: String,
    pub art_style: ArtStyle,
    pub target_audience: Audience,
    pub script: ComicScript,
    pub texts: Vec<PanelText>,
    pub artwork: ArtworkSet,
    pub clips: Option<ClipSet>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
