//! Text-generation capability and the OpenRouter adapter.
//!
//! OpenRouter speaks the OpenAI chat-completions wire format: a bearer
//! token, a model id, and a message list in; the first choice's message
//! content out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::retry::{with_retry, RetryConfig};

/// Default OpenRouter API base.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// One text-generation request.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    /// Optional system message framing the task.
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl TextRequest {
    /// A request with the prompt and default sampling parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.8,
            max_tokens: 8000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Narrow capability interface for text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt, or fail with a provider error.
    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// OpenRouter adapter
// ---------------------------------------------------------------------------

/// HTTP client for the OpenRouter chat-completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryConfig,
}

impl OpenRouterClient {
    /// Create a client for the given API key and model id.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            api_key,
            model,
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different API base (used in tests and for
    /// self-hosted gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn chat(&self, request: &TextRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
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

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::Malformed(
                "Chat completion returned no content".to_string(),
            ));
        }

        Ok(content)
    }
}

#[async_trait]
impl TextGenerator for OpenRouterClient {
    async fn generate(&self, request: &TextRequest) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Requesting chat completion",
        );
        with_retry(&self.retry, "openrouter.chat", || self.chat(request)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
