//! Error type for document extraction.

use docchat_core::error::DocChatError;

/// Failure while turning an uploaded file into text.
///
/// The display string is what the client sees in the upload error payload.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("file is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("DOCX error: {0}")]
    Docx(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("image error: {0}")]
    Image(String),
    #[error("OCR error: {0}")]
    Ocr(String),
    #[error("extraction task failed: {0}")]
    Task(String),
}

impl From<ExtractionError> for DocChatError {
    fn from(err: ExtractionError) -> Self {
        DocChatError::Extraction(err.to_string())
    }
}
