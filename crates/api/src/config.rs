//! Server and generator configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use inkforge_pipeline::config::PipelineConfig;

/// HTTP server configuration.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}

/// Generation backend configuration: provider credentials, artifact
/// storage, and pipeline tuning.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenRouter API key; the text provider is unconfigured without it.
    pub openrouter_api_key: Option<String>,
    /// OpenRouter model id.
    pub openrouter_model: String,
    /// ModelsLab API key; the media provider is unconfigured without it.
    pub modelslab_api_key: Option<String>,
    /// Root directory for uploads and produced artifacts.
    pub output_dir: PathBuf,
    /// Pipelines allowed to run at once.
    pub max_concurrent_jobs: usize,
    /// Concurrent panel-image requests within one visual stage.
    pub max_parallel_panels: usize,
    /// Seconds between polls of a pending media request.
    pub media_poll_interval_secs: u64,
    /// Per-request window for a pending media request to resolve.
    pub media_poll_timeout_secs: u64,
}

impl GeneratorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                     |
    /// |----------------------------|-----------------------------|
    /// | `OPENROUTER_API_KEY`       | unset                       |
    /// | `OPENROUTER_MODEL`         | `xiaomi/mimo-v2-flash:free` |
    /// | `MODELSLAB_API_KEY`        | unset                       |
    /// | `OUTPUT_DIR`               | `outputs`                   |
    /// | `MAX_CONCURRENT_JOBS`      | `4`                         |
    /// | `MAX_PARALLEL_PANELS`      | `5`                         |
    /// | `MEDIA_POLL_INTERVAL_SECS` | `2`                         |
    /// | `MEDIA_POLL_TIMEOUT_SECS`  | `120`                       |
    pub fn from_env() -> Self {
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").ok().filter(|s| !s.is_empty());
        let openrouter_model = std::env::var("OPENROUTER_MODEL")
            .unwrap_or_else(|_| "xiaomi/mimo-v2-flash:free".into());
        let modelslab_api_key = std::env::var("MODELSLAB_API_KEY").ok().filter(|s| !s.is_empty());

        let output_dir = PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "outputs".into()));

        let max_concurrent_jobs: usize = std::env::var("MAX_CONCURRENT_JOBS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("MAX_CONCURRENT_JOBS must be a valid usize");

        let max_parallel_panels: usize = std::env::var("MAX_PARALLEL_PANELS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("MAX_PARALLEL_PANELS must be a valid usize");

        let media_poll_interval_secs: u64 = std::env::var("MEDIA_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("MEDIA_POLL_INTERVAL_SECS must be a valid u64");

        let media_poll_timeout_secs: u64 = std::env::var("MEDIA_POLL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("MEDIA_POLL_TIMEOUT_SECS must be a valid u64");

        Self {
            openrouter_api_key,
            openrouter_model,
            modelslab_api_key,
            output_dir,
            max_concurrent_jobs,
            max_parallel_panels,
            media_poll_interval_secs,
            media_poll_timeout_secs,
        }
    }

    /// Pipeline tuning derived from this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_parallel_panels: self.max_parallel_panels,
            media_poll_interval: Duration::from_secs(self.media_poll_interval_secs),
            media_poll_timeout: Duration::from_secs(self.media_poll_timeout_secs),
            ..PipelineConfig::default()
        }
    }
}
