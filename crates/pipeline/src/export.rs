//! Export boundary.
//!
//! Binary format encoding (PDF, CBZ) lives outside this system; the
//! assembly stage hands a finished [`AssembledBook`] to an [`ExportSink`]
//! once per requested format and records the artifact reference it gets
//! back. The production sink is wired in by the API crate.

use async_trait::async_trait;

use inkforge_core::artwork::AssembledBook;
use inkforge_core::generation::OutputFormat;
use inkforge_core::job::ArtifactRef;

/// Errors from an export sink.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Failed(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Failed(format!("Manifest serialization failed: {e}"))
    }
}

/// Narrow interface the assembly stage uses to materialize one output
/// format from an assembled book.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn export(
        &self,
        book: &AssembledBook,
        format: OutputFormat,
    ) -> Result<ArtifactRef, ExportError>;
}
