//! Pipeline stage names, ordering, and progress milestone weights.
//!
//! Weights are fixed configuration constants, not derived at runtime. The
//! orchestrator sets a job's progress to the completed stage's milestone
//! after each stage; the video stage is simply absent from the plan when a
//! request did not ask for video output.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stage names
// ---------------------------------------------------------------------------

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Ingest,
    Story,
    Script,
    Text,
    Visual,
    Video,
    Assembly,
}

impl StageName {
    /// Stable label used in `current_stage` and `error.stage`.
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Ingest => "ingest",
            StageName::Story => "story",
            StageName::Script => "script",
            StageName::Text => "text",
            StageName::Visual => "visual",
            StageName::Video => "video",
            StageName::Assembly => "assembly",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Milestone weights
// ---------------------------------------------------------------------------

/// Progress after source ingestion.
pub const WEIGHT_INGEST: f64 = 0.10;
/// Progress after the story outline.
pub const WEIGHT_STORY: f64 = 0.30;
/// Progress after the panel script.
pub const WEIGHT_SCRIPT: f64 = 0.50;
/// Progress after captions and dialogue.
pub const WEIGHT_TEXT: f64 = 0.60;
/// Progress after all panel artwork.
pub const WEIGHT_VISUAL: f64 = 0.85;
/// Progress after all video clips (video runs only when requested).
pub const WEIGHT_VIDEO: f64 = 0.95;
/// Progress after assembly; always the terminal milestone.
pub const WEIGHT_ASSEMBLY: f64 = 1.0;

/// Stage order including the video stage.
const PLAN_WITH_VIDEO: &[StageName] = &[
    StageName::Ingest,
    StageName::Story,
    StageName::Script,
    StageName::Text,
    StageName::Visual,
    StageName::Video,
    StageName::Assembly,
];

/// Stage order when video output was not requested.
const PLAN_WITHOUT_VIDEO: &[StageName] = &[
    StageName::Ingest,
    StageName::Story,
    StageName::Script,
    StageName::Text,
    StageName::Visual,
    StageName::Assembly,
];

/// The ordered stage plan for a run.
pub fn stage_plan(with_video: bool) -> &'static [StageName] {
    if with_video {
        PLAN_WITH_VIDEO
    } else {
        PLAN_WITHOUT_VIDEO
    }
}

/// Progress milestone reached when `stage` completes.
pub fn milestone(stage: StageName) -> f64 {
    match stage {
        StageName::Ingest => WEIGHT_INGEST,
        StageName::Story => WEIGHT_STORY,
        StageName::Script => WEIGHT_SCRIPT,
        StageName::Text => WEIGHT_TEXT,
        StageName::Visual => WEIGHT_VISUAL,
        StageName::Video => WEIGHT_VIDEO,
        StageName::Assembly => WEIGHT_ASSEMBLY,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
