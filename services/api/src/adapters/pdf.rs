//! services/api/src/adapters/pdf.rs
//!
//! Extracts plain text from PDF bytes with `pdf-extract`. Implements the
//! `TextExtractor` port. Parsing is CPU-bound, so it runs on the blocking pool.

use async_trait::async_trait;
use bytes::Bytes;
use study_relay_core::{
    domain::DocumentText,
    ports::{PortError, PortResult, TextExtractor},
};
use tracing::info;

#[derive(Clone, Copy, Debug, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(data: &[u8]) -> PortResult<String> {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| PortError::Extraction(format!("Failed to extract text from PDF: {e}")))
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, data: Bytes) -> PortResult<DocumentText> {
        // A panic inside the PDF parser surfaces as a join error and is reported the same way.
        let raw = tokio::task::spawn_blocking(move || Self::extract_blocking(&data))
            .await
            .map_err(|e| PortError::Extraction(format!("PDF extraction aborted: {e}")))??;

        let text = DocumentText::new(normalize_page_breaks(&raw).trim());
        info!(chars = text.char_count(), "PDF text extraction complete.");
        Ok(text)
    }
}

/// Page breaks come back as form feeds; pages are joined with a newline instead.
fn normalize_page_breaks(raw: &str) -> String {
    raw.replace('\u{c}', "\n")
}
