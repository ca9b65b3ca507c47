//! Handlers for job status, listing, and deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use inkforge_core::error::CoreError;
use inkforge_core::job::{Job, JobError, JobResult, JobStatus};
use inkforge_core::types::{JobId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Snapshot returned by `GET /api/v1/status/{job_id}`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: f64,
    pub current_stage: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Job> for StatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            current_stage: job.current_stage,
            message: job.message,
            result: job.result,
            error: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// GET /api/v1/status/{job_id}
///
/// Current job snapshot. Failed jobs stay queryable (stage and error kind
/// included) until deleted.
pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = state
        .registry
        .get(job_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    Ok(Json(DataResponse {
        data: StatusResponse::from(job),
    }))
}

/// GET /api/v1/jobs
///
/// Job summaries, newest first.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs = state.registry.list().await;
    Ok(Json(DataResponse { data: jobs }))
}

/// DELETE /api/v1/jobs/{job_id}
///
/// Remove the job from the registry and best-effort remove its artifact
/// directory. An in-flight run observes the missing record at its next
/// stage boundary and aborts. Returns 204.
pub async fn remove(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    state.registry.delete(job_id).await?;

    let artifacts = state
        .generator
        .output_dir
        .join("jobs")
        .join(job_id.to_string());
    if let Err(e) = tokio::fs::remove_dir_all(&artifacts).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(%job_id, error = %e, "Could not remove job artifacts");
        }
    }

    tracing::info!(%job_id, "Job deleted");
    Ok(StatusCode::NO_CONTENT)
}
