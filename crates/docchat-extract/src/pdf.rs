//! PDF text extraction via `lopdf`.

use std::path::Path;

use tracing::debug;

use crate::error::ExtractionError;

/// Concatenate the text of every page, in page order.
pub fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load(path).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", page_number, e)))?;
        text.push_str(&page_text);
    }

    debug!(pages = pages.len(), chars = text.len(), "PDF text extracted");
    Ok(text)
}
