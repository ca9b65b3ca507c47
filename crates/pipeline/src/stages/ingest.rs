//! Ingest stage: turn the request's source material into validated text.
//!
//! Text sources pass through after trimming. Uploaded documents are read
//! from disk; PDFs get their text extracted with lopdf, anything else is
//! treated as plain text. Empty or unreadable sources are invalid input,
//! never retried.

use inkforge_core::generation::SourceMaterial;
use inkforge_core::story::SourceText;

use crate::stage::StageError;

pub async fn run(source: &SourceMaterial) -> Result<SourceText, StageError> {
    let text = match source {
        SourceMaterial::Text { text } => text.trim().to_string(),
        SourceMaterial::Document { path, filename } => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                StageError::invalid_input(format!("Could not read uploaded document: {e}"))
            })?;
            extract_document_text(&bytes, filename)?
        }
    };

    if text.is_empty() {
        return Err(StageError::invalid_input(
            "Source contains no text to work from",
        ));
    }

    let source_text = SourceText::from_text(text);
    tracing::info!(words = source_text.word_count, "Source text extracted");
    Ok(source_text)
}

/// Extract text from an uploaded document's bytes.
fn extract_document_text(bytes: &[u8], filename: &str) -> Result<String, StageError> {
    if is_pdf(bytes, filename) {
        extract_pdf_text(bytes)
    } else {
        Ok(String::from_utf8_lossy(bytes).trim().to_string())
    }
}

/// Sniff for PDF by extension or magic bytes.
fn is_pdf(bytes: &[u8], filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf") || bytes.starts_with(b"%PDF")
}

/// Pull the text content out of every page of a PDF.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, StageError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| StageError::invalid_input(format!("Could not parse PDF: {e}")))?;

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(StageError::invalid_input("PDF contains no pages"));
    }

    let text = doc
        .extract_text(&pages)
        .map_err(|e| StageError::invalid_input(format!("Could not extract PDF text: {e}")))?;

    Ok(text.trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
