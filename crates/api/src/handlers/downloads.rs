//! Handler for `GET /api/v1/download/{job_id}`.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use serde::Deserialize;

use inkforge_core::error::CoreError;
use inkforge_core::generation::OutputFormat;
use inkforge_core::job::JobStatus;
use inkforge_core::types::JobId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Requested artifact format; defaults to pdf.
    pub format: Option<String>,
}

/// GET /api/v1/download/{job_id}?format=pdf
///
/// Streams the artifact bytes for the requested format. 404 for unknown
/// jobs or formats that were not produced, 409 while the job is not yet
/// completed.
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<impl IntoResponse> {
    let job = state
        .registry
        .get(job_id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    if job.status != JobStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Job is not completed (status: {})",
            job.status.as_str()
        ))));
    }

    let format = OutputFormat::parse(query.format.as_deref().unwrap_or("pdf"))?;

    let result = job
        .result
        .as_ref()
        .ok_or_else(|| AppError::InternalError("Completed job has no result".to_string()))?;

    let artifact = result
        .artifacts
        .get(&format)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Artifact",
            id: job_id,
        }))?;

    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| {
            tracing::warn!(%job_id, path = %artifact.path.display(), error = %e, "Artifact file unreadable");
            AppError::Core(CoreError::NotFound {
                entity: "Artifact",
                id: job_id,
            })
        })?;

    let extension = artifact
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(format.as_str());
    let filename = format!("{}.{extension}", safe_title(&result.title));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&artifact.content_type)
            .map_err(|e| AppError::InternalError(format!("Bad content type: {e}")))?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| AppError::InternalError(format!("Bad filename: {e}")))?,
    );

    Ok((headers, bytes))
}

/// Reduce a title to a filename-safe form.
fn safe_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "comic".to_string()
    } else {
        trimmed.to_string()
    }
}
