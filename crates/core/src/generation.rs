//! Generation request model, enumerated parameters, and validation.
//!
//! Everything a client supplies to start a comic generation run lives here,
//! along with the bounds the request boundary enforces before a job is
//! created.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Request bounds and defaults
// ---------------------------------------------------------------------------

/// Minimum number of comic pages a request may ask for.
pub const MIN_TARGET_PAGES: u32 = 1;
/// Maximum number of comic pages a request may ask for.
pub const MAX_TARGET_PAGES: u32 = 50;
/// Page count used when the request does not specify one.
pub const DEFAULT_TARGET_PAGES: u32 = 10;

/// Panels the script stage plans per page.
pub const PANELS_PER_PAGE: u32 = 4;

/// Upper bound on caption length, in words.
pub const CAPTION_MAX_WORDS: usize = 20;

/// Title used when the request does not supply one.
pub const DEFAULT_TITLE: &str = "Untitled Comic";

// ---------------------------------------------------------------------------
// Enumerated parameters
// ---------------------------------------------------------------------------

/// Art style applied to every generated panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtStyle {
    Cartoon,
    Manga,
    Noir,
    Watercolor,
    PixelArt,
    Realistic,
}

impl ArtStyle {
    /// Stable string form, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtStyle::Cartoon => "cartoon",
            ArtStyle::Manga => "manga",
            ArtStyle::Noir => "noir",
            ArtStyle::Watercolor => "watercolor",
            ArtStyle::PixelArt => "pixel-art",
            ArtStyle::Realistic => "realistic",
        }
    }

    /// All valid style names, for error messages.
    pub const ALL: &'static [ArtStyle] = &[
        ArtStyle::Cartoon,
        ArtStyle::Manga,
        ArtStyle::Noir,
        ArtStyle::Watercolor,
        ArtStyle::PixelArt,
        ArtStyle::Realistic,
    ];

    /// Parse a style name. Unknown names list the valid set.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid art style '{s}'. Must be one of: {}",
                    join_names(Self::ALL.iter().map(|v| v.as_str()))
                ))
            })
    }
}

/// Audience the story and dialogue are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
    Children,
    YoungAdult,
    General,
    Mature,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Children => "children",
            Audience::YoungAdult => "young-adult",
            Audience::General => "general",
            Audience::Mature => "mature",
        }
    }

    pub const ALL: &'static [Audience] = &[
        Audience::Children,
        Audience::YoungAdult,
        Audience::General,
        Audience::Mature,
    ];

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid target audience '{s}'. Must be one of: {}",
                    join_names(Self::ALL.iter().map(|v| v.as_str()))
                ))
            })
    }
}

/// Output formats a job can be asked to produce.
///
/// Requesting `video` also enables the video generation stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Cbz,
    Web,
    Video,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Cbz => "cbz",
            OutputFormat::Web => "web",
            OutputFormat::Video => "video",
        }
    }

    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::Pdf,
        OutputFormat::Cbz,
        OutputFormat::Web,
        OutputFormat::Video,
    ];

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid output format '{s}'. Must be one of: {}",
                    join_names(Self::ALL.iter().map(|v| v.as_str()))
                ))
            })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Source material
// ---------------------------------------------------------------------------

/// Where the source text comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceMaterial {
    /// Raw text pasted into the request.
    Text { text: String },
    /// An uploaded document saved to disk by the request boundary.
    Document { path: PathBuf, filename: String },
}

// ---------------------------------------------------------------------------
// Generation input
// ---------------------------------------------------------------------------

/// Validated parameters for one generation run, stored on the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationInput {
    pub title: String,
    pub source: SourceMaterial,
    pub art_style: ArtStyle,
    pub target_pages: u32,
    pub target_audience: Audience,
    /// Requested output formats, deduplicated, never empty.
    pub output_formats: Vec<OutputFormat>,
}

impl GenerationInput {
    /// Whether the video stage should run for this request.
    pub fn wants_video(&self) -> bool {
        self.output_formats.contains(&OutputFormat::Video)
    }

    /// Validate the whole request. Called by the boundary before a job is
    /// created; a failure here means no job record exists.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_target_pages(self.target_pages)?;

        if let SourceMaterial::Text { text } = &self.source {
            if text.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Source text must not be empty; provide 'text' or 'file'".to_string(),
                ));
            }
        }

        if self.output_formats.is_empty() {
            return Err(CoreError::Validation(
                "At least one output format is required".to_string(),
            ));
        }

        let unique: BTreeSet<_> = self.output_formats.iter().copied().collect();
        if unique.len() != self.output_formats.len() {
            return Err(CoreError::Validation(
                "Duplicate output format in request".to_string(),
            ));
        }

        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(
                "Title must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Validate that a requested page count is within the allowed range.
pub fn validate_target_pages(pages: u32) -> Result<(), CoreError> {
    if !(MIN_TARGET_PAGES..=MAX_TARGET_PAGES).contains(&pages) {
        return Err(CoreError::Validation(format!(
            "target_pages must be between {MIN_TARGET_PAGES} and {MAX_TARGET_PAGES}, got {pages}"
        )));
    }
    Ok(())
}

/// Parse a comma-separated list of output formats (e.g. `"pdf,web"`).
///
/// Order is preserved; duplicates are rejected by
/// [`GenerationInput::validate`].
pub fn parse_output_formats(s: &str) -> Result<Vec<OutputFormat>, CoreError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(OutputFormat::parse)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
