//! Visual stage: one artwork image per panel, all-or-nothing.
//!
//! Panel requests are dispatched concurrently up to the configured
//! parallelism cap and joined before the stage completes; the first
//! failure fails the whole stage. Sub-tasks may finish out of order, so
//! results are re-sorted into ascending panel order before leaving.

use futures::stream::{self, StreamExt, TryStreamExt};

use inkforge_core::artwork::{ArtworkSet, PanelArt};
use inkforge_core::generation::GenerationInput;
use inkforge_core::script::{ComicScript, Panel};
use inkforge_providers::media::{ImageGenerator, ImageRequest, MediaDispatch};

use crate::config::PipelineConfig;
use crate::stage::StageError;
use crate::stages::poll_until_ready;

pub async fn run(
    images: &dyn ImageGenerator,
    config: &PipelineConfig,
    input: &GenerationInput,
    script: &ComicScript,
) -> Result<ArtworkSet, StageError> {
    tracing::info!(
        panels = script.panel_count(),
        parallelism = config.max_parallel_panels,
        "Generating panel artwork",
    );

    let futures: Vec<_> = script
        .panels
        .iter()
        .map(|panel| generate_panel(images, config, input, panel))
        .collect();
    let panels = stream::iter(futures)
        .buffer_unordered(config.max_parallel_panels)
        .try_collect::<Vec<_>>()
        .await?;

    let mut set = ArtworkSet { panels };
    set.sort_by_panel();
    Ok(set)
}

async fn generate_panel(
    images: &dyn ImageGenerator,
    config: &PipelineConfig,
    input: &GenerationInput,
    panel: &Panel,
) -> Result<PanelArt, StageError> {
    let prompt = panel_prompt(panel, input);
    let request = ImageRequest {
        prompt: prompt.clone(),
        negative_prompt: None,
        width: config.image_width,
        height: config.image_height,
    };

    let dispatch = images.text_to_image(&request).await.map_err(|e| {
        StageError::generation(format!(
            "Panel {} image generation failed: {e}",
            panel.number
        ))
    })?;

    let image_url = match dispatch {
        MediaDispatch::Ready(url) => url,
        MediaDispatch::Pending {
            request_id,
            eta_secs,
        } => {
            tracing::debug!(
                panel = panel.number,
                request_id = %request_id,
                eta_secs,
                "Image pending, polling",
            );
            poll_until_ready(
                || images.fetch_image(&request_id),
                config.media_poll_interval,
                config.media_poll_timeout,
                &format!("Panel {} image", panel.number),
            )
            .await?
        }
    };

    Ok(PanelArt {
        panel: panel.number,
        image_url,
        prompt,
    })
}

/// Image prompt for one panel, consistent with the chosen style.
fn panel_prompt(panel: &Panel, input: &GenerationInput) -> String {
    let mut prompt = format!(
        "Comic book panel {}: {}. Mood: {}.",
        panel.number, panel.description, panel.mood
    );
    if let Some(angle) = &panel.camera_angle {
        prompt.push_str(&format!(" {angle} shot."));
    }
    if !panel.characters.is_empty() {
        prompt.push_str(&format!(" Featuring {}.", panel.characters.join(", ")));
    }
    prompt.push_str(&format!(
        " {} style comic art for a {} audience.",
        input.art_style.as_str(),
        input.target_audience.as_str()
    ));
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
