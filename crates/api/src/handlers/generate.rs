//! Handler for `POST /api/v1/generate`.
//!
//! Parses the multipart form, validates everything before any job record
//! exists, saves an uploaded document to disk, creates the job, and
//! schedules the pipeline without blocking the response.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use inkforge_core::generation::{
    parse_output_formats, ArtStyle, Audience, GenerationInput, OutputFormat, SourceMaterial,
    DEFAULT_TARGET_PAGES, DEFAULT_TITLE,
};
use inkforge_core::job::JobStatus;
use inkforge_core::types::JobId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for a successfully queued generation request.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Raw multipart fields before validation.
#[derive(Default)]
struct RawRequest {
    text: Option<String>,
    title: Option<String>,
    art_style: Option<String>,
    target_pages: Option<String>,
    target_audience: Option<String>,
    output_formats: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

/// POST /api/v1/generate
///
/// Accepts `text` or `file` plus style/page/audience/format parameters,
/// returns `202 { job_id, status }` immediately. Validation failures are
/// rejected before a job is created.
pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let raw = read_multipart(multipart).await?;
    let input = build_input(&state, raw).await?;
    input.validate()?;

    let job = state.registry.create(input).await;
    state.runner.spawn(job.id);

    tracing::info!(
        job_id = %job.id,
        title = %job.input.title,
        pages = job.input.target_pages,
        "Generation request queued",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: GenerateResponse {
                job_id: job.id,
                status: job.status,
            },
        }),
    ))
}

/// Drain the multipart stream into [`RawRequest`].
async fn read_multipart(mut multipart: Multipart) -> AppResult<RawRequest> {
    let mut raw = RawRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => raw.text = Some(read_text(field).await?),
            "title" => raw.title = Some(read_text(field).await?),
            "art_style" => raw.art_style = Some(read_text(field).await?),
            "target_pages" => raw.target_pages = Some(read_text(field).await?),
            "target_audience" => raw.target_audience = Some(read_text(field).await?),
            "output_formats" => raw.output_formats = Some(read_text(field).await?),
            "file" => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Could not read upload: {e}")))?;
                raw.file = Some((filename, bytes.to_vec()));
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    Ok(raw)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not read form field: {e}")))
}

/// Turn raw fields into a validated [`GenerationInput`], persisting an
/// uploaded document under the output directory.
async fn build_input(state: &AppState, raw: RawRequest) -> AppResult<GenerationInput> {
    let source = match (raw.file, raw.text) {
        (Some((filename, bytes)), _) => {
            let path = save_upload(state, &filename, &bytes).await?;
            SourceMaterial::Document { path, filename }
        }
        (None, Some(text)) => SourceMaterial::Text { text },
        (None, None) => {
            return Err(AppError::Core(inkforge_core::error::CoreError::Validation(
                "Provide either 'text' or 'file'".to_string(),
            )));
        }
    };

    let art_style = match raw.art_style.as_deref() {
        Some(s) => ArtStyle::parse(s)?,
        None => ArtStyle::Cartoon,
    };
    let target_audience = match raw.target_audience.as_deref() {
        Some(s) => Audience::parse(s)?,
        None => Audience::General,
    };
    let target_pages = match raw.target_pages.as_deref() {
        Some(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("target_pages must be an integer, got '{s}'")))?,
        None => DEFAULT_TARGET_PAGES,
    };
    let output_formats: Vec<OutputFormat> = match raw.output_formats.as_deref() {
        Some(s) => parse_output_formats(s)?,
        None => vec![OutputFormat::Pdf],
    };

    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(GenerationInput {
        title,
        source,
        art_style,
        target_pages,
        target_audience,
        output_formats,
    })
}

/// Write an uploaded document to the uploads directory and return its path.
async fn save_upload(state: &AppState, filename: &str, bytes: &[u8]) -> AppResult<std::path::PathBuf> {
    let uploads = state.generator.output_dir.join("uploads");
    tokio::fs::create_dir_all(&uploads)
        .await
        .map_err(|e| AppError::InternalError(format!("Could not create uploads dir: {e}")))?;

    let path = uploads.join(format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename)));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Could not save upload: {e}")))?;

    Ok(path)
}

/// Keep uploaded filenames to a safe character set.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}
