//! Job lifecycle model.
//!
//! A [`Job`] tracks one generation request from `queued` through a terminal
//! state. Only the orchestrator task that owns a job mutates it; once
//! terminal it is read-only except for deletion.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::{GenerationInput, OutputFormat};
use crate::progress::StageName;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status and error taxonomy
// ---------------------------------------------------------------------------

/// Job execution status. Transitions follow the total order
/// queued -> processing -> {completed | failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Whether the job has finished (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Classification of a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed, empty, or unsupported input. Never retried.
    InvalidInput,
    /// A provider call failed or returned unusable output.
    Generation,
    /// A required upstream artifact was missing at synthesis time.
    Assembly,
    /// A pending provider request never resolved within its window.
    Timeout,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Generation => "generation",
            ErrorKind::Assembly => "assembly",
            ErrorKind::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded on a job when a stage fails; identifies the stage and the error
/// class so clients can see what went wrong without internal detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub stage: StageName,
    pub kind: ErrorKind,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Reference to one produced artifact on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub path: PathBuf,
    pub content_type: String,
}

/// Final output of a completed job: one artifact per requested format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub title: String,
    pub total_pages: u32,
    pub total_panels: u32,
    pub artifacts: BTreeMap<OutputFormat, ArtifactRef>,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One generation request's full lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Fraction complete in `[0.0, 1.0]`; monotonically non-decreasing
    /// while processing, exactly 1.0 only when completed.
    pub progress: f64,
    /// Label of the stage in flight.
    pub current_stage: String,
    /// Free-text detail for the current stage.
    pub message: String,
    pub input: GenerationInput,
    /// Present only when status is `completed`.
    pub result: Option<JobResult>,
    /// Present only when status is `failed`.
    pub error: Option<JobError>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Create a fresh queued job for the given input.
    pub fn new(input: GenerationInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            progress: 0.0,
            current_stage: "queued".to_string(),
            message: "Comic generation queued".to_string(),
            input,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Summary projection used by the job listing endpoint.
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            title: self.input.title.clone(),
            status: self.status,
            progress: self.progress,
            current_stage: self.current_stage.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Slim view of a job for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub progress: f64,
    pub current_stage: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
