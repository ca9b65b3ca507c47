pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST   /generate            submit a generation request
/// GET    /status/{job_id}     job snapshot (status, progress, result/error)
/// GET    /download/{job_id}   artifact bytes, ?format=pdf|cbz|web|video
/// GET    /jobs                job summaries, newest first
/// DELETE /jobs/{job_id}       remove a job and its artifacts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate::generate))
        .route("/status/{job_id}", get(handlers::jobs::status))
        .route("/download/{job_id}", get(handlers::downloads::download))
        .route("/jobs", get(handlers::jobs::list))
        .route("/jobs/{job_id}", delete(handlers::jobs::remove))
}
