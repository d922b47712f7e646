use std::sync::Arc;

use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::domain::session::{SessionState, SourceDocument};

/// Extraction boundary. The server only ever sees plain text; how it is
/// pulled out of the PDF is the extractor's business.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> AppResult<String>;
}

#[derive(Default)]
pub struct PdfTextExtractor;

impl DocumentExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> AppResult<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| AppError::ServiceError(format!("PDF text extraction failed: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub characters: usize,
    pub cached: bool,
    /// Extraction succeeded but produced no text, e.g. a scanned PDF.
    pub extracted_empty: bool,
}

pub struct DocumentService {
    extractor: Arc<dyn DocumentExtractor>,
}

impl DocumentService {
    pub fn new(extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self { extractor }
    }

    /// Extracts and stores the document text for a session. Re-uploading the
    /// file under the same name reuses the cached text instead of extracting
    /// again.
    pub fn ingest(
        &self,
        state: &mut SessionState,
        filename: &str,
        bytes: &[u8],
    ) -> AppResult<IngestOutcome> {
        let filename = filename.trim();
        if filename.is_empty() || !filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(AppError::ValidationError(format!(
                "expected a .pdf filename, got '{filename}'"
            )));
        }

        if let Some(document) = &state.document {
            if document.filename == filename {
                log::debug!("session {}: reusing cached text for {filename}", state.id);
                return Ok(IngestOutcome {
                    characters: document.text.chars().count(),
                    cached: true,
                    extracted_empty: document.is_extracted_empty(),
                });
            }
        }

        let text = self.extractor.extract_text(bytes)?;
        let document = SourceDocument {
            filename: filename.to_string(),
            text,
            uploaded_at: Utc::now(),
        };
        let outcome = IngestOutcome {
            characters: document.text.chars().count(),
            cached: false,
            extracted_empty: document.is_extracted_empty(),
        };

        log::info!(
            "session {}: ingested {filename} ({} chars{})",
            state.id,
            outcome.characters,
            if outcome.extracted_empty {
                ", no extractable text"
            } else {
                ""
            }
        );
        state.document = Some(document);
        Ok(outcome)
    }
}
