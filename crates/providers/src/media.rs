//! Image and video generation capabilities and the ModelsLab adapter.
//!
//! ModelsLab responses carry a `status` field: `success` returns the output
//! URL immediately, `processing` returns a request id that must be polled
//! via the matching fetch endpoint, anything else is a provider-reported
//! failure. Both the image and video capabilities expose that dispatch /
//! fetch pair; the polling policy (interval, timeout) belongs to the
//! pipeline, not the adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::retry::{with_retry, RetryConfig};

/// Default ModelsLab API base.
pub const DEFAULT_MODELSLAB_BASE_URL: &str = "https://modelslab.com/api/v6";

/// Negative prompt applied when a request does not supply one.
const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, deformed";

// ---------------------------------------------------------------------------
// Requests and dispatch results
// ---------------------------------------------------------------------------

/// One image-generation request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// One video-generation request.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub num_frames: u32,
}

/// Outcome of dispatching a media request.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDispatch {
    /// The provider produced the output synchronously.
    Ready(String),
    /// The provider accepted the request and will resolve it later; poll
    /// the fetch endpoint with `request_id`.
    Pending {
        request_id: String,
        eta_secs: Option<u64>,
    },
}

/// Outcome of one fetch poll for a pending request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// The output URL is ready.
    Ready(String),
    /// Still processing; poll again later.
    Processing,
    /// The provider gave up on this request.
    Failed(String),
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Narrow capability interface for image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn text_to_image(&self, request: &ImageRequest) -> Result<MediaDispatch, ProviderError>;

    /// Poll a pending image request.
    async fn fetch_image(&self, request_id: &str) -> Result<FetchStatus, ProviderError>;
}

/// Narrow capability interface for video generation.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn text_to_video(&self, request: &VideoRequest) -> Result<MediaDispatch, ProviderError>;

    /// Poll a pending video request.
    async fn fetch_video(&self, request_id: &str) -> Result<FetchStatus, ProviderError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Text2ImageBody<'a> {
    key: &'a str,
    model_id: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    samples: u32,
    num_inference_steps: u32,
    guidance_scale: f64,
}

#[derive(Debug, Serialize)]
struct Text2VideoBody<'a> {
    key: &'a str,
    model_id: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    num_frames: u32,
    num_inference_steps: u32,
    guidance_scale: f64,
}

#[derive(Debug, Serialize)]
struct FetchBody<'a> {
    key: &'a str,
}

/// Common shape of ModelsLab generation and fetch responses.
#[derive(Debug, Deserialize)]
struct ModelsLabResponse {
    status: String,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    eta: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl ModelsLabResponse {
    fn into_dispatch(self) -> Result<MediaDispatch, ProviderError> {
        match self.status.as_str() {
            "success" => {
                let url = self.output.into_iter().next().ok_or_else(|| {
                    ProviderError::Malformed("success response with empty output".to_string())
                })?;
                Ok(MediaDispatch::Ready(url))
            }
            "processing" => {
                let request_id = self.request_id()?;
                Ok(MediaDispatch::Pending {
                    request_id,
                    eta_secs: self.eta.map(|e| e.max(0.0) as u64),
                })
            }
            other => Err(ProviderError::Provider(format!(
                "status '{other}': {}",
                ProviderError::summarize_body(self.message.as_deref().unwrap_or("no detail"))
            ))),
        }
    }

    fn into_fetch_status(self) -> Result<FetchStatus, ProviderError> {
        match self.status.as_str() {
            "success" => {
                let url = self.output.into_iter().next().ok_or_else(|| {
                    ProviderError::Malformed("success response with empty output".to_string())
                })?;
                Ok(FetchStatus::Ready(url))
            }
            "processing" => Ok(FetchStatus::Processing),
            "error" | "failed" => Ok(FetchStatus::Failed(ProviderError::summarize_body(
                self.message.as_deref().unwrap_or("no detail"),
            ))),
            other => Err(ProviderError::Malformed(format!(
                "unexpected fetch status '{other}'"
            ))),
        }
    }

    /// The request id, as a string whether the provider sent a number or a
    /// string.
    fn request_id(&self) -> Result<String, ProviderError> {
        match &self.id {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ProviderError::Malformed(
                "processing response without request id".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelsLab adapter
// ---------------------------------------------------------------------------

/// Image model parameters.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            model: "flux".to_string(),
            width: 1024,
            height: 1024,
            steps: 30,
            guidance_scale: 7.5,
        }
    }
}

/// Video model parameters.
#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub num_frames: u32,
    pub steps: u32,
    pub guidance_scale: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            model: "cogvideox".to_string(),
            width: 512,
            height: 512,
            num_frames: 25,
            steps: 20,
            guidance_scale: 7.0,
        }
    }
}

/// HTTP client for the ModelsLab image and video APIs.
pub struct ModelsLabClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    image: ImageSettings,
    video: VideoSettings,
    retry: RetryConfig,
}

impl ModelsLabClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_MODELSLAB_BASE_URL.to_string(),
            api_key,
            image: ImageSettings::default(),
            video: VideoSettings::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_settings(mut self, settings: ImageSettings) -> Self {
        self.image = settings;
        self
    }

    pub fn with_video_settings(mut self, settings: VideoSettings) -> Self {
        self.video = settings;
        self
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ModelsLabResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: ProviderError::summarize_body(&body),
            });
        }

        Ok(response.json().await?)
    }

    async fn fetch(&self, path: String) -> Result<FetchStatus, ProviderError> {
        let body = FetchBody { key: &self.api_key };
        let response = with_retry(&self.retry, "modelslab.fetch", || {
            self.post_json(&path, &body)
        })
        .await?;
        response.into_fetch_status()
    }
}

#[async_trait]
impl ImageGenerator for ModelsLabClient {
    async fn text_to_image(&self, request: &ImageRequest) -> Result<MediaDispatch, ProviderError> {
        let body = Text2ImageBody {
            key: &self.api_key,
            model_id: &self.image.model,
            prompt: &request.prompt,
            negative_prompt: request
                .negative_prompt
                .as_deref()
                .unwrap_or(DEFAULT_NEGATIVE_PROMPT),
            width: request.width,
            height: request.height,
            samples: 1,
            num_inference_steps: self.image.steps,
            guidance_scale: self.image.guidance_scale,
        };

        tracing::debug!(model = %self.image.model, "Dispatching text2img");
        let response = with_retry(&self.retry, "modelslab.text2img", || {
            self.post_json("/images/text2img", &body)
        })
        .await?;
        response.into_dispatch()
    }

    async fn fetch_image(&self, request_id: &str) -> Result<FetchStatus, ProviderError> {
        self.fetch(format!("/images/fetch/{request_id}")).await
    }
}

#[async_trait]
impl VideoGenerator for ModelsLabClient {
    async fn text_to_video(&self, request: &VideoRequest) -> Result<MediaDispatch, ProviderError> {
        let body = Text2VideoBody {
            key: &self.api_key,
            model_id: &self.video.model,
            prompt: &request.prompt,
            negative_prompt: request
                .negative_prompt
                .as_deref()
                .unwrap_or("low quality, blurry, static, choppy"),
            width: request.width,
            height: request.height,
            num_frames: request.num_frames,
            num_inference_steps: self.video.steps,
            guidance_scale: self.video.guidance_scale,
        };

        tracing::debug!(model = %self.video.model, "Dispatching text2video");
        let response = with_retry(&self.retry, "modelslab.text2video", || {
            self.post_json("/video/text2video", &body)
        })
        .await?;
        response.into_dispatch()
    }

    async fn fetch_video(&self, request_id: &str) -> Result<FetchStatus, ProviderError> {
        self.fetch(format!("/video/fetch/{request_id}")).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_maps_to_ready() {
        let json = r#"{"status": "success", "output": ["https://img.example/1.png"]}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.into_dispatch().unwrap(),
            MediaDispatch::Ready("https://img.example/1.png".to_string())
        );
    }

    #[test]
    fn processing_response_maps_to_pending_with_numeric_id() {
        let json = r#"{"status": "processing", "id": 12345, "eta": 20.5}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.into_dispatch().unwrap(),
            MediaDispatch::Pending {
                request_id: "12345".to_string(),
                eta_secs: Some(20),
            }
        );
    }

    #[test]
    fn processing_response_accepts_string_id() {
        let json = r#"{"status": "processing", "id": "req-9"}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.into_dispatch().unwrap(),
            MediaDispatch::Pending {
                request_id: "req-9".to_string(),
                eta_secs: None,
            }
        );
    }

    #[test]
    fn error_response_maps_to_provider_error() {
        let json = r#"{"status": "error", "message": "invalid api key"}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed.into_dispatch(),
            Err(ProviderError::Provider(_))
        ));
    }

    #[test]
    fn success_with_empty_output_is_malformed() {
        let json = r#"{"status": "success", "output": []}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed.into_dispatch(),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn processing_without_id_is_malformed() {
        let json = r#"{"status": "processing"}"#;
        let parsed: ModelsLabResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed.into_dispatch(),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn fetch_status_variants() {
        let ready: ModelsLabResponse =
            serde_json::from_str(r#"{"status": "success", "output": ["u"]}"#).unwrap();
        assert_eq!(
            ready.into_fetch_status().unwrap(),
            FetchStatus::Ready("u".to_string())
        );

        let processing: ModelsLabResponse =
            serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(
            processing.into_fetch_status().unwrap(),
            FetchStatus::Processing
        );

        let failed: ModelsLabResponse =
            serde_json::from_str(r#"{"status": "failed", "message": "gpu error"}"#).unwrap();
        assert_eq!(
            failed.into_fetch_status().unwrap(),
            FetchStatus::Failed("gpu error".to_string())
        );
    }
}
