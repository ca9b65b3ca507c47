use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Downstream provider configuration status.
    pub services: ServiceStatus,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub text_provider: &'static str,
    pub media_provider: &'static str,
}

fn configured(flag: bool) -> &'static str {
    if flag {
        "configured"
    } else {
        "not_configured"
    }
}

/// GET /health -- liveness plus downstream-service configuration status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state.providers;
    let status = if providers.text_configured && providers.media_configured {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        services: ServiceStatus {
            text_provider: configured(providers.text_configured),
            media_provider: configured(providers.media_configured),
        },
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
