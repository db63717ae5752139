//! OCR engine trait and implementations.
//!
//! `TesseractOcrService` shells out to the `tesseract` binary. Image bytes are
//! normalised to PNG before they reach an `OcrService`, so implementations
//! only ever see one format.

use std::io::{Cursor, Write};
use std::process::Stdio;

use async_trait::async_trait;
use image::ImageFormat;
use tracing::debug;

use crate::error::ExtractionError;

/// Service for extracting text from images.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Extract text from PNG-encoded image data.
    ///
    /// Returns the recognised text, which may be empty.
    async fn extract_text(&self, png_data: &[u8]) -> Result<String, ExtractionError>;
}

/// Decode an image in any supported format and re-encode it as PNG.
pub fn normalize_to_png(image_data: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    if image_data.is_empty() {
        return Err(ExtractionError::Image("Empty image data".to_string()));
    }
    let decoded =
        image::load_from_memory(image_data).map_err(|e| ExtractionError::Image(e.to_string()))?;

    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ExtractionError::Image(e.to_string()))?;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "Image decoded for OCR"
    );
    Ok(png.into_inner())
}

/// Configuration for the Tesseract OCR service.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Executable name or path.
    pub command: String,
    /// Tesseract language code (e.g. "eng", "deu").
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

impl From<&docchat_core::config::OcrSettings> for OcrConfig {
    fn from(settings: &docchat_core::config::OcrSettings) -> Self {
        Self {
            command: settings.tesseract_cmd.clone(),
            language: settings.language.clone(),
        }
    }
}

/// OCR service backed by the Tesseract command-line tool.
pub struct TesseractOcrService {
    config: OcrConfig,
}

impl TesseractOcrService {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

#[async_trait]
impl OcrService for TesseractOcrService {
    async fn extract_text(&self, png_data: &[u8]) -> Result<String, ExtractionError> {
        if png_data.is_empty() {
            return Err(ExtractionError::Ocr("Empty image data".to_string()));
        }

        // The temp file must outlive the child process.
        let mut input = tempfile::Builder::new()
            .prefix("docchat-ocr-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(png_data)?;
        input.flush()?;

        let output = tokio::process::Command::new(&self.config.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ExtractionError::Ocr(format!("Failed to run {}: {}", self.config.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.config.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR completed");
        Ok(text)
    }
}

/// Mock OCR service for testing.
///
/// Returns a fixed string without running a real OCR engine.
#[derive(Debug, Clone)]
pub struct MockOcrService {
    response_text: String,
}

impl MockOcrService {
    pub fn new() -> Self {
        Self {
            response_text: "Mock OCR extracted text".to_string(),
        }
    }

    /// Create a mock OCR service that returns the specified text.
    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
        }
    }
}

impl Default for MockOcrService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrService for MockOcrService {
    async fn extract_text(&self, png_data: &[u8]) -> Result<String, ExtractionError> {
        if png_data.is_empty() {
            return Err(ExtractionError::Ocr("Empty image data".to_string()));
        }
        Ok(self.response_text.clone())
    }
}
