//! Shared test app builder, provider mocks, and request helpers for API
//! integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use inkforge_api::config::{GeneratorConfig, ServerConfig};
use inkforge_api::router::build_app_router;
use inkforge_api::state::{AppState, ProviderStatus};
use inkforge_core::artwork::AssembledBook;
use inkforge_core::generation::OutputFormat;
use inkforge_core::job::ArtifactRef;
use inkforge_pipeline::config::PipelineConfig;
use inkforge_pipeline::export::{ExportError, ExportSink};
use inkforge_pipeline::orchestrator::Orchestrator;
use inkforge_pipeline::registry::JobRegistry;
use inkforge_pipeline::runner::JobRunner;
use inkforge_providers::error::ProviderError;
use inkforge_providers::media::{
    FetchStatus, ImageGenerator, ImageRequest, MediaDispatch, VideoGenerator, VideoRequest,
};
use inkforge_providers::text::{TextGenerator, TextRequest};

// ---------------------------------------------------------------------------
// Provider mocks
// ---------------------------------------------------------------------------

/// Answers the story/script/text prompts with well-formed fixtures for a
/// 1-page, 2-panel comic.
pub struct MockText;

const PAGES: u32 = 1;
const PANELS: u32 = 2;

#[async_trait]
impl TextGenerator for MockText {
    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError> {
        let prompt = &request.prompt;
        if prompt.contains("story outline") {
            Ok(outline_json())
        } else if prompt.contains("numbered comic panels") {
            Ok(script_json())
        } else if prompt.contains("captions and dialogue") {
            Ok(texts_json())
        } else {
            Err(ProviderError::Malformed("unrecognized prompt".to_string()))
        }
    }
}

fn outline_json() -> String {
    serde_json::json!({
        "title": "Test Comic",
        "genre": "adventure",
        "summary": "A short test story, expanded.",
        "themes": [],
        "characters": [{"name": "Ava", "appearance": "red scarf", "role": "protagonist"}],
        "scenes": [{"number": 1, "heading": "Scene 1", "synopsis": "Things happen."}],
    })
    .to_string()
}

fn script_json() -> String {
    let panels: Vec<serde_json::Value> = (1..=PANELS)
        .map(|n| {
            serde_json::json!({
                "number": n,
                "page": 1,
                "description": format!("Ava in scene {n}"),
                "mood": "bright",
            })
        })
        .collect();
    serde_json::json!({
        "title": "Test Comic",
        "total_pages": PAGES,
        "panels": panels,
    })
    .to_string()
}

fn texts_json() -> String {
    let objs: Vec<serde_json::Value> = (1..=PANELS)
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

pub struct MockImages;

#[async_trait]
impl ImageGenerator for MockImages {
    async fn text_to_image(&self, _request: &ImageRequest) -> Result<MediaDispatch, ProviderError> {
        Ok(MediaDispatch::Ready("https://img.test/panel.png".to_string()))
    }

    async fn fetch_image(&self, _request_id: &str) -> Result<FetchStatus, ProviderError> {
        Ok(FetchStatus::Processing)
    }
}

pub struct MockVideos;

#[async_trait]
impl VideoGenerator for MockVideos {
    async fn text_to_video(&self, _request: &VideoRequest) -> Result<MediaDispatch, ProviderError> {
        Ok(MediaDispatch::Ready("https://v.test/clip.mp4".to_string()))
    }

    async fn fetch_video(&self, _request_id: &str) -> Result<FetchStatus, ProviderError> {
        Ok(FetchStatus::Processing)
    }
}

/// Writes a small `book.json` per format so the download endpoint has real
/// bytes to serve; never touches the network.
pub struct FileSink {
    root: PathBuf,
}

#[async_trait]
impl ExportSink for FileSink {
    async fn export(
        &self,
        book: &AssembledBook,
        format: OutputFormat,
    ) -> Result<ArtifactRef, ExportError> {
        let dir = self
            .root
            .join("jobs")
            .join(book.job_id.to_string())
            .join(format.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join("book.json");
        let manifest = serde_json::json!({
            "title": book.title,
            "total_panels": book.script.panels.len(),
            "format": format.as_str(),
        });
        tokio::fs::write(&path, manifest.to_string()).await?;

        Ok(ArtifactRef {
            path,
            content_type: "application/json".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
    }
}

fn test_generator_config(output_dir: PathBuf) -> GeneratorConfig {
    GeneratorConfig {
        openrouter_api_key: Some("test-key".to_string()),
        openrouter_model: "test-model".to_string(),
        modelslab_api_key: Some("test-key".to_string()),
        output_dir,
        max_concurrent_jobs: 4,
        max_parallel_panels: 5,
        media_poll_interval_secs: 1,
        media_poll_timeout_secs: 5,
    }
}

/// Build the full application router over mock providers and a unique
/// temp output directory. Mirrors the construction in `main.rs` so tests
/// exercise the same middleware stack production uses.
pub fn build_test_app() -> (Router, AppState) {
    let output_dir =
        std::env::temp_dir().join(format!("inkforge-api-test-{}", uuid::Uuid::new_v4()));

    let registry = Arc::new(JobRegistry::new());
    let sink = Arc::new(FileSink {
        root: output_dir.clone(),
    });

    let pipeline_config = PipelineConfig {
        media_poll_interval: Duration::from_millis(2),
        media_poll_timeout: Duration::from_millis(50),
        ..PipelineConfig::default()
    };

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&registry),
        Arc::new(MockText) as Arc<dyn TextGenerator>,
        Arc::new(MockImages) as Arc<dyn ImageGenerator>,
        Arc::new(MockVideos) as Arc<dyn VideoGenerator>,
        sink as Arc<dyn ExportSink>,
        pipeline_config,
    ));
    let runner = Arc::new(JobRunner::new(orchestrator, 4));

    let config = test_config();
    let state = AppState {
        registry,
        runner,
        config: Arc::new(config.clone()),
        generator: Arc::new(test_generator_config(output_dir)),
        providers: ProviderStatus {
            text_configured: true,
            media_configured: true,
        },
    };

    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

const BOUNDARY: &str = "inkforge-test-boundary";

/// Build a multipart/form-data body from text fields and an optional file
/// part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(fields, file)))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Poll the status endpoint until the job reaches a terminal state and
/// return the final status payload.
pub async fn poll_until_terminal(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..500 {
        let response = get(app, &format!("/api/v1/status/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let status = json["data"]["status"].as_str().unwrap().to_string();
        if status == "completed" || status == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} did not reach a terminal state in time");
}
