//! DocChat extraction crate - uploaded documents to plain text.
//!
//! Dispatches on the file extension to a format-specific reader: `lopdf` for
//! PDF, `zip` + `quick-xml` for DOCX, `csv` / `calamine` for tables, and an
//! `OcrService` for images. Unknown extensions yield a placeholder string
//! rather than an error.

pub mod docx;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod sheet;
pub mod table;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

pub use error::ExtractionError;
pub use ocr::{MockOcrService, OcrConfig, OcrService, TesseractOcrService};
pub use table::TextTable;

/// Text stored for files whose type is not recognised.
pub const UNSUPPORTED_PLACEHOLDER: &str = "Unsupported file type, but file received.";

/// Extraction strategy selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
    Docx,
    Csv,
    Workbook,
    Image,
    Unsupported,
}

impl FileKind {
    /// Classify a lower- or mixed-case extension without the leading dot.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => FileKind::Pdf,
            "txt" | "py" | "html" | "css" | "js" | "json" => FileKind::Text,
            "docx" => FileKind::Docx,
            "csv" => FileKind::Csv,
            "xlsx" | "xls" => FileKind::Workbook,
            "png" | "jpg" | "jpeg" => FileKind::Image,
            _ => FileKind::Unsupported,
        }
    }
}

/// Extension of a client-supplied filename: the text after the last `.`,
/// lowercased. A name without a dot is its own extension.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Converts files on disk into text.
#[derive(Clone)]
pub struct DocumentExtractor {
    ocr: Arc<dyn OcrService>,
}

impl DocumentExtractor {
    pub fn new(ocr: Arc<dyn OcrService>) -> Self {
        Self { ocr }
    }

    /// Extract the text of `path`, interpreting it according to `extension`.
    pub async fn extract(&self, path: &Path, extension: &str) -> Result<String, ExtractionError> {
        let kind = FileKind::from_extension(extension);
        debug!(?kind, path = %path.display(), "Extracting document");

        match kind {
            FileKind::Unsupported => Ok(UNSUPPORTED_PLACEHOLDER.to_string()),
            FileKind::Image => {
                let data = tokio::fs::read(path).await?;
                let png = run_blocking(move || ocr::normalize_to_png(&data)).await?;
                self.ocr.extract_text(&png).await
            }
            _ => {
                let path = path.to_path_buf();
                run_blocking(move || extract_blocking(kind, &path)).await
            }
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, ExtractionError>
where
    F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

fn extract_blocking(kind: FileKind, path: &Path) -> Result<String, ExtractionError> {
    match kind {
        FileKind::Pdf => pdf::extract_pdf(path),
        FileKind::Text => Ok(String::from_utf8(std::fs::read(path)?)?),
        FileKind::Docx => docx::extract_docx(path),
        FileKind::Csv => Ok(sheet::read_csv(path)?.render()),
        FileKind::Workbook => Ok(sheet::read_workbook(path)?.render()),
        FileKind::Image | FileKind::Unsupported => Ok(UNSUPPORTED_PLACEHOLDER.to_string()),
    }
}
