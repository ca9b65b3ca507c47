//! Assembly stage: verify every upstream artifact is present, compose the
//! final book, and export one artifact per requested format.
//!
//! A missing panel input here means an upstream contract violation, not a
//! provider hiccup, so failures carry the assembly error kind and are
//! never retried.

use std::collections::BTreeMap;

use inkforge_core::artwork::{ArtworkSet, AssembledBook, ClipSet};
use inkforge_core::generation::{GenerationInput, OutputFormat};
use inkforge_core::job::JobResult;
use inkforge_core::script::{validate_panel_texts, ComicScript, PanelText};
use inkforge_core::types::JobId;

use crate::export::ExportSink;
use crate::stage::StageError;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    sink: &dyn ExportSink,
    job_id: JobId,
    input: &GenerationInput,
    script: &ComicScript,
    texts: &[PanelText],
    artwork: &ArtworkSet,
    clips: Option<&ClipSet>,
) -> Result<JobResult, StageError> {
    artwork
        .validate_against(script)
        .map_err(|e| StageError::assembly(e.to_string()))?;
    validate_panel_texts(texts, script).map_err(|e| StageError::assembly(e.to_string()))?;

    if input.wants_video() {
        let clips = clips.ok_or_else(|| {
            StageError::assembly("Video output requested but no clips were produced")
        })?;
        clips
            .validate_against(script)
            .map_err(|e| StageError::assembly(e.to_string()))?;
    }

    let book = AssembledBook {
        job_id,
        title: input.title.clone(),
        art_style: input.art_style,
        target_audience: input.target_audience,
        script: script.clone(),
        texts: texts.to_vec(),
        artwork: artwork.clone(),
        clips: clips.cloned(),
    };

    let mut artifacts = BTreeMap::new();
    for &format in &input.output_formats {
        let artifact = sink.export(&book, format).await.map_err(|e| {
            StageError::assembly(format!("Export to {} failed: {e}", format.as_str()))
        })?;
        tracing::info!(
            format = format.as_str(),
            path = %artifact.path.display(),
            "Format exported",
        );
        artifacts.insert(format, artifact);
    }

    Ok(JobResult {
        title: input.title.clone(),
        total_pages: script.total_pages,
        total_panels: script.panel_count(),
        artifacts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
