//! Video stage: an animated clip per panel. Runs only when the request
//! asked for video output.
//!
//! Clip dispatches usually come back pending; each pending request is
//! polled until it resolves or its per-clip window expires. Results are
//! re-sorted into ascending panel order.

use inkforge_core::artwork::{ClipSet, PanelClip};
use inkforge_core::generation::GenerationInput;
use inkforge_core::script::{ComicScript, Panel};
use inkforge_providers::media::{MediaDispatch, VideoGenerator, VideoRequest};

use crate::config::PipelineConfig;
use crate::stage::StageError;
use crate::stages::poll_until_ready;

pub async fn run(
    videos: &dyn VideoGenerator,
    config: &PipelineConfig,
    input: &GenerationInput,
    script: &ComicScript,
) -> Result<ClipSet, StageError> {
    tracing::info!(panels = script.panel_count(), "Generating panel clips");

    let mut clips = Vec::with_capacity(script.panels.len());
    let mut pending: Vec<(u32, String)> = Vec::new();

    // Dispatch every clip first, then poll the pending ones.
    for panel in &script.panels {
        let request = VideoRequest {
            prompt: clip_prompt(panel, input),
            negative_prompt: None,
            width: config.video_width,
            height: config.video_height,
            num_frames: config.video_frames,
        };

        let dispatch = videos.text_to_video(&request).await.map_err(|e| {
            StageError::generation(format!(
                "Panel {} clip generation failed: {e}",
                panel.number
            ))
        })?;

        match dispatch {
            MediaDispatch::Ready(url) => clips.push(clip(panel.number, url, config)),
            MediaDispatch::Pending {
                request_id,
                eta_secs,
            } => {
                tracing::debug!(
                    panel = panel.number,
                    request_id = %request_id,
                    eta_secs,
                    "Clip pending, will poll",
                );
                pending.push((panel.number, request_id));
            }
        }
    }

    for (panel, request_id) in pending {
        let url = poll_until_ready(
            || videos.fetch_video(&request_id),
            config.media_poll_interval,
            config.media_poll_timeout,
            &format!("Panel {panel} clip"),
        )
        .await?;
        clips.push(clip(panel, url, config));
    }

    let mut set = ClipSet { clips };
    set.sort_by_panel();
    Ok(set)
}

fn clip(panel: u32, video_url: String, config: &PipelineConfig) -> PanelClip {
    PanelClip {
        panel,
        video_url,
        duration_secs: config.clip_duration_secs(),
    }
}

/// Motion prompt for one panel's clip.
fn clip_prompt(panel: &Panel, input: &GenerationInput) -> String {
    format!(
        "Animate comic panel {}: {}. Mood: {}. Subtle camera motion, {} style.",
        panel.number,
        panel.description,
        panel.mood,
        input.art_style.as_str()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
