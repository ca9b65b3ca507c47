//! Tunable pipeline parameters.

use std::time::Duration;

/// Knobs for the stage executors. All values are configuration, not
/// contracts; the defaults match the original service's settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Concurrent panel-image requests in flight during the visual stage.
    pub max_parallel_panels: usize,
    /// Generated image dimensions.
    pub image_width: u32,
    pub image_height: u32,
    /// Generated clip dimensions and length.
    pub video_width: u32,
    pub video_height: u32,
    pub video_frames: u32,
    /// Playback rate used to derive clip duration from the frame count.
    pub video_fps: f64,
    /// Sleep between polls of a pending media request.
    pub media_poll_interval: Duration,
    /// Per-request window for a pending media request to resolve.
    pub media_poll_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_panels: 5,
            image_width: 1024,
            image_height: 1024,
            video_width: 512,
            video_height: 512,
            video_frames: 25,
            video_fps: 8.0,
            media_poll_interval: Duration::from_secs(2),
            media_poll_timeout: Duration::from_secs(120),
        }
    }
}

impl PipelineConfig {
    /// Duration of one generated clip in seconds.
    pub fn clip_duration_secs(&self) -> f64 {
        self.video_frames as f64 / self.video_fps
    }
}
