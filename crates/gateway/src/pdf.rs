//! PDF text extraction for uploaded documents.
//!
//! Extraction is page-by-page: a page whose text cannot be decoded is
//! logged and skipped rather than failing the whole document, so partially
//! scanned PDFs still yield whatever text they carry.

use gstmate_core::error::DocumentError;
use lopdf::Document;
use tracing::{debug, warn};

/// Extract the text of a PDF from its raw bytes.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::ParseFailed(e.to_string()))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page");
            }
        }
    }

    debug!(chars = text.len(), "Extracted PDF text");
    Ok(text)
}
