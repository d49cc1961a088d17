//! Document-to-text extraction for uploaded files.

use std::path::Path;

use lopdf::Document as PdfDocument;

use crate::error::ExtractError;
use crate::types::Document;

/// Turns raw file bytes into plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;

    fn name(&self) -> &str;
}

/// Concatenates the text of every page of a PDF.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let document = PdfDocument::load_mem(bytes).map_err(|err| ExtractError::Pdf {
            message: format!("failed to open PDF: {err}"),
        })?;

        let pages = document.get_pages();
        if pages.is_empty() {
            return Ok(String::new());
        }
        let page_numbers = pages.keys().copied().collect::<Vec<u32>>();
        tracing::debug!(pages = page_numbers.len(), "Extracting PDF text");

        let text = document
            .extract_text(&page_numbers)
            .map_err(|err| ExtractError::Pdf {
                message: format!("failed to extract text: {err}"),
            })?;
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(String::from_utf8_lossy(bytes).trim().to_string())
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Pick an extractor by file extension. Anything other than `.pdf` is text.
pub fn extractor_for_path(path: &Path) -> Box<dyn DocumentExtractor> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Box::new(PdfExtractor)
    } else {
        Box::new(PlainTextExtractor)
    }
}

/// Read a file and extract its text into a [`Document`].
pub async fn extract_file(path: &Path) -> Result<Document, ExtractError> {
    let bytes = tokio::fs::read(path).await?;
    let extractor = extractor_for_path(path);
    tracing::info!(
        path = %path.display(),
        extractor = extractor.name(),
        bytes = bytes.len(),
        "Extracting document"
    );
    extractor.extract(&bytes).map(Document::extracted)
}
