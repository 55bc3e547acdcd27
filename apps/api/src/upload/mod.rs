//! Resume upload handling: PDF checks, temp-file persistence and text extraction.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// Characters of extracted text echoed back to the client after upload.
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExtractError(pub String);

/// Turns raw document bytes into plain text.
///
/// Carried in `AppState` as `Arc<dyn TextExtractor>`. Implementations are
/// synchronous and run on the blocking pool.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Default extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError(e.to_string()))
    }
}

/// Accepts a part as PDF by content type or by `.pdf` file extension.
pub fn is_pdf(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false);
    let by_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    by_type || by_name
}

/// Runs extraction on the blocking pool. A panic inside the PDF library is
/// reported as an unreadable PDF.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    bytes: Bytes,
) -> Result<String, AppError> {
    let result = tokio::task::spawn_blocking(move || extractor.extract(&bytes)).await;
    match result {
        Ok(Ok(text)) => {
            debug!("Extracted {} characters from upload", text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(AppError::UnreadablePdf(format!(
            "Failed to extract text: {e}"
        ))),
        Err(join_error) if join_error.is_panic() => Err(AppError::UnreadablePdf(
            "Failed to extract text: PDF parser crashed on this file".to_string(),
        )),
        Err(join_error) => Err(AppError::Internal(
            anyhow::Error::new(join_error).context("PDF extraction task failed"),
        )),
    }
}

/// Writes the upload to a `resume_*.pdf` temp file in `dir`. The file is
/// deleted when the returned handle is dropped.
pub async fn persist_upload(dir: PathBuf, bytes: Bytes) -> Result<NamedTempFile, AppError> {
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("resume_")
            .suffix(".pdf")
            .tempfile_in(&dir)
            .with_context(|| format!("Failed to create upload file in {}", dir.display()))?;
        file.write_all(&bytes).context("Failed to write upload")?;
        file.flush().context("Failed to flush upload")?;
        Ok(file)
    })
    .await
    .context("Upload persistence task failed")?;

    Ok(result?)
}

/// First `max_chars` characters of `text`, trimmed.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
pub mod stub {
    use super::{ExtractError, TextExtractor};

    /// Returns fixed text, or fails, regardless of input.
    pub struct StubExtractor(pub Result<String, String>);

    impl TextExtractor for StubExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
            self.0.clone().map_err(ExtractError)
        }
    }

    pub struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
            panic!("malformed xref table")
        }
    }
}
