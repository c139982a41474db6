//! services/api/src/adapters/pdf.rs
//!
//! This module contains the PDF text extractor.
//! It implements the `TextExtractionService` port from the `core` crate.

use async_trait::async_trait;
use docqa_core::ports::TextExtractionService;
use tracing::{info, warn};

/// Extracts page text with `pdf-extract` on the blocking thread pool.
#[derive(Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractionService for PdfTextExtractor {
    /// Returns the document's text in page order, or an empty string if the
    /// bytes cannot be parsed.
    async fn extract_text(&self, file_bytes: &[u8]) -> String {
        let pdf_bytes = file_bytes.to_vec();
        let result =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
                .await;

        match result {
            Ok(Ok(text)) => {
                info!("Extracted {} characters from PDF.", text.chars().count());
                text
            }
            Ok(Err(e)) => {
                warn!("PDF extraction error: {}", e);
                String::new()
            }
            // The parser panics on some malformed inputs; the panic surfaces as a join error.
            Err(e) => {
                warn!("PDF extraction task failed: {}", e);
                String::new()
            }
        }
    }
}
