use std::sync::Arc;

use inkforge_pipeline::registry::JobRegistry;
use inkforge_pipeline::runner::JobRunner;

use crate::config::{GeneratorConfig, ServerConfig};

/// Which downstream providers have credentials configured. Reported by
/// the health endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ProviderStatus {
    pub text_configured: bool,
    pub media_configured: bool,
}

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is `Copy`).
#[derive(Clone)]
pub struct AppState {
    /// Job registry: the only shared mutable state in the service.
    pub registry: Arc<JobRegistry>,
    /// Background scheduler for pipeline runs.
    pub runner: Arc<JobRunner>,
    /// HTTP server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation backend configuration (output paths, limits).
    pub generator: Arc<GeneratorConfig>,
    /// Downstream provider configuration status.
    pub providers: ProviderStatus,
}
