//! Shared mocks and fixtures for pipeline integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use inkforge_core::artwork::AssembledBook;
use inkforge_core::generation::{
    ArtStyle, Audience, GenerationInput, OutputFormat, SourceMaterial,
};
use inkforge_core::job::{ArtifactRef, Job};
use inkforge_core::types::JobId;
use inkforge_pipeline::config::PipelineConfig;
use inkforge_pipeline::export::{ExportError, ExportSink};
use inkforge_pipeline::orchestrator::Orchestrator;
use inkforge_pipeline::registry::JobRegistry;
use inkforge_providers::error::ProviderError;
use inkforge_providers::media::{
    FetchStatus, ImageGenerator, ImageRequest, MediaDispatch, VideoGenerator, VideoRequest,
};
use inkforge_providers::text::{TextGenerator, TextRequest};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn text_input(pages: u32, formats: Vec<OutputFormat>) -> GenerationInput {
    GenerationInput {
        title: "Test Comic".to_string(),
        source: SourceMaterial::Text {
            text: "A short test story.".to_string(),
        },
        art_style: ArtStyle::Cartoon,
        target_pages: pages,
        target_audience: Audience::General,
        output_formats: formats,
    }
}

pub fn outline_json(pages: u32) -> String {
    let scenes: Vec<serde_json::Value> = (1..=pages)
        .map(|n| {
            serde_json::json!({
                "number": n,
                "heading": format!("Scene {n}"),
                "synopsis": format!("Things happen in scene {n}."),
            })
        })
        .collect();
    serde_json::json!({
        "title": "Test Comic",
        "genre": "adventure",
        "summary": "A short test story, expanded.",
        "themes": ["testing"],
        "characters": [
            {"name": "Ava", "appearance": "red scarf", "role": "protagonist"}
        ],
        "scenes": scenes,
    })
    .to_string()
}

pub fn script_json(pages: u32, panels: u32) -> String {
    let panel_objs: Vec<serde_json::Value> = (1..=panels)
        .map(|n| {
            let page = ((n - 1) * pages) / panels + 1;
            serde_json::json!({
                "number": n,
                "page": page,
                "description": format!("Ava in scene {n}"),
                "mood": "bright",
                "camera_angle": "medium",
                "characters": ["Ava"],
            })
        })
        .collect();
    serde_json::json!({
        "title": "Test Comic",
        "total_pages": pages,
        "panels": panel_objs,
    })
    .to_string()
}

pub fn texts_json(panels: u32) -> String {
    let objs: Vec<serde_json::Value> = (1..=panels)
        .map(|n| {
            serde_json::json!({
                "panel": n,
                "caption": format!("Caption {n}"),
                "dialogue": [{"speaker": "Ava", "line": format!("Line {n}")}],
            })
        })
        .collect();
    serde_json::to_string(&objs).unwrap()
}

// ---------------------------------------------------------------------------
// Text generator mock
// ---------------------------------------------------------------------------

/// Pair of signals used to hold a run inside its first provider call.
pub struct Gate {
    /// Notified when the gated call is entered.
    pub entered: Arc<Notify>,
    /// The call proceeds once this is notified.
    pub release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

/// Responds to the story/script/text prompts with well-formed fixtures,
/// keyed off each prompt's distinctive instruction phrase.
pub struct MockText {
    pages: u32,
    panels: u32,
    pub calls: AtomicUsize,
    concurrent: AtomicUsize,
    pub max_concurrent: AtomicUsize,
    work_delay: Duration,
    gate_first_call: Option<Gate>,
}

impl MockText {
    pub fn new(pages: u32, panels: u32) -> Self {
        Self {
            pages,
            panels,
            calls: AtomicUsize::new(0),
            concurrent: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
            work_delay: Duration::ZERO,
            gate_first_call: None,
        }
    }

    /// Block the first generate call until the gate is released.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate_first_call = Some(gate);
        self
    }

    /// Simulate provider latency on every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.work_delay = delay;
        self
    }
}

#[async_trait]
impl TextGenerator for MockText {
    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            if let Some(gate) = &self.gate_first_call {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }

        let current = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(current, Ordering::SeqCst);
        if !self.work_delay.is_zero() {
            tokio::time::sleep(self.work_delay).await;
        }
        self.concurrent.fetch_sub(1, Ordering::SeqCst);

        let prompt = &request.prompt;
        if prompt.contains("story outline") {
            Ok(outline_json(self.pages))
        } else if prompt.contains("numbered comic panels") {
            Ok(script_json(self.pages, self.panels))
        } else if prompt.contains("captions and dialogue") {
            Ok(texts_json(self.panels))
        } else {
            Err(ProviderError::Malformed(format!(
                "mock got unrecognized prompt: {prompt:.60}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Image generator mock
// ---------------------------------------------------------------------------

/// Returns a ready image per panel, optionally failing the panel whose
/// prompt names `fail_on`.
pub struct MockImages {
    pub fail_on: Option<u32>,
    pub calls: AtomicUsize,
}

impl MockImages {
    pub fn ready() -> Self {
        Self {
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(panel: u32) -> Self {
        Self {
            fail_on: Some(panel),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    async fn text_to_image(&self, request: &ImageRequest) -> Result<MediaDispatch, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fail) = self.fail_on {
            if request.prompt.contains(&format!("panel {fail}:")) {
                return Err(ProviderError::Provider("synthetic image failure".to_string()));
            }
        }
        Ok(MediaDispatch::Ready(format!("https://img.test/{n}.png")))
    }

    async fn fetch_image(&self, _request_id: &str) -> Result<FetchStatus, ProviderError> {
        Ok(FetchStatus::Processing)
    }
}

// ---------------------------------------------------------------------------
// Video generator mock
// ---------------------------------------------------------------------------

pub enum VideoMode {
    /// Every dispatch resolves immediately.
    Ready,
    /// Every dispatch goes pending and never resolves.
    NeverResolves,
}

pub struct MockVideos {
    pub mode: VideoMode,
    pub calls: AtomicUsize,
}

impl MockVideos {
    pub fn ready() -> Self {
        Self {
            mode: VideoMode::Ready,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn never_resolves() -> Self {
        Self {
            mode: VideoMode::NeverResolves,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VideoGenerator for MockVideos {
    async fn text_to_video(&self, _request: &VideoRequest) -> Result<MediaDispatch, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            VideoMode::Ready => Ok(MediaDispatch::Ready(format!("https://v.test/{n}.mp4"))),
            VideoMode::NeverResolves => Ok(MediaDispatch::Pending {
                request_id: format!("stuck-{n}"),
                eta_secs: None,
            }),
        }
    }

    async fn fetch_video(&self, request_id: &str) -> Result<FetchStatus, ProviderError> {
        match self.mode {
            VideoMode::Ready => Ok(FetchStatus::Ready(format!(
                "https://v.test/{request_id}.mp4"
            ))),
            VideoMode::NeverResolves => Ok(FetchStatus::Processing),
        }
    }
}

// ---------------------------------------------------------------------------
// Export sink mock
// ---------------------------------------------------------------------------

/// Captures the assembled books it is asked to export; writes nothing.
#[derive(Default)]
pub struct CapturingSink {
    pub books: Mutex<Vec<AssembledBook>>,
}

#[async_trait]
impl ExportSink for CapturingSink {
    async fn export(
        &self,
        book: &AssembledBook,
        format: OutputFormat,
    ) -> Result<ArtifactRef, ExportError> {
        self.books.lock().unwrap().push(book.clone());
        Ok(ArtifactRef {
            path: format!("/tmp/inkforge-test/{}/{}/book.json", book.job_id, format.as_str())
                .into(),
            content_type: "application/json".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub registry: Arc<JobRegistry>,
    pub text: Arc<MockText>,
    pub images: Arc<MockImages>,
    pub videos: Arc<MockVideos>,
    pub sink: Arc<CapturingSink>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Pipeline config with millisecond-scale polling for tests.
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        media_poll_interval: Duration::from_millis(2),
        media_poll_timeout: Duration::from_millis(40),
        ..PipelineConfig::default()
    }
}

pub fn harness(text: MockText, images: MockImages, videos: MockVideos) -> Harness {
    let registry = Arc::new(JobRegistry::new());
    let text = Arc::new(text);
    let images = Arc::new(images);
    let videos = Arc::new(videos);
    let sink = Arc::new(CapturingSink::default());

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&registry),
        Arc::clone(&text) as Arc<dyn TextGenerator>,
        Arc::clone(&images) as Arc<dyn ImageGenerator>,
        Arc::clone(&videos) as Arc<dyn VideoGenerator>,
        Arc::clone(&sink) as Arc<dyn ExportSink>,
        fast_config(),
    ));

    Harness {
        registry,
        text,
        images,
        videos,
        sink,
        orchestrator,
    }
}

/// Poll the registry until the job reaches a terminal state.
pub async fn wait_terminal(registry: &JobRegistry, id: JobId) -> Job {
    for _ in 0..500 {
        if let Some(job) = registry.get(id).await {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {id} did not reach a terminal state in time");
}
