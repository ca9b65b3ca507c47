//! Stage failure type and shared helpers for parsing model output.

use inkforge_core::error::CoreError;
use inkforge_core::job::ErrorKind;
use inkforge_providers::error::ProviderError;

/// A typed stage failure: the taxonomy kind plus a human-readable message.
///
/// The orchestrator records the failing stage's name alongside this when it
/// marks a job failed.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StageError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Generation,
            message: message.into(),
        }
    }

    pub fn assembly(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Assembly,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for StageError {
    /// A provider failure that escaped the adapter's retry layer is a
    /// generation error for the calling stage.
    fn from(e: ProviderError) -> Self {
        StageError::generation(e.to_string())
    }
}

impl From<CoreError> for StageError {
    /// Stage-output shape violations surface as generation errors; the
    /// provider produced something the pipeline contract rejects.
    fn from(e: CoreError) -> Self {
        StageError::generation(e.to_string())
    }
}

/// Extract the JSON document from raw model output.
///
/// Models wrap JSON in code fences or prose despite instructions; take the
/// slice from the first opening brace/bracket to the matching last closer.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let open = trimmed.find(['{', '[']);
    let close = trimmed.rfind(['}', ']']);
    match (open, close) {
        (Some(start), Some(end)) if end >= start => &trimmed[start..=end],
        _ => trimmed,
    }
}
