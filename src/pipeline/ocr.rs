//! OCR fallback: rasterise a page prefix and run a recognition capability.
//!
//! Recognition is a capability interface so the pipeline can be exercised
//! with deterministic fakes; the shipped implementation shells out to the
//! Tesseract CLI rather than binding libtesseract, which keeps the build
//! free of C dependencies and matches how the binary is deployed (tesseract
//! installed alongside, like the pdfium library).
//!
//! The OCR result is best-effort by contract: an empty string is a valid,
//! non-error outcome and downstream stages must tolerate it. Only the
//! recogniser itself breaking (missing binary, non-zero exit) is an error.

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::pipeline::render;
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Best-effort text recognition over one rendered page image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognise text in the image. Empty output is a valid result.
    async fn recognize(&self, image: &DynamicImage) -> Result<String, IntakeError>;
}

/// Recogniser backed by the Tesseract CLI.
///
/// Invokes `tesseract <page.png> stdout -l <lang>` with the page written to
/// a scoped temp directory. Requires tesseract on PATH (or an explicit
/// binary path in the config).
pub struct TesseractRecognizer {
    binary: String,
    language: String,
}

impl TesseractRecognizer {
    /// Build a recogniser from the intake config.
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.ocr_language.clone(),
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, IntakeError> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| IntakeError::Internal(format!("PNG encoding failed: {}", e)))?;

        let dir = tempfile::tempdir()
            .map_err(|e| IntakeError::Internal(format!("tempdir: {}", e)))?;
        let page_path = dir.path().join("page.png");
        tokio::fs::write(&page_path, &png)
            .await
            .map_err(|e| IntakeError::Internal(format!("Failed to write page image: {}", e)))?;

        let output = tokio::process::Command::new(&self.binary)
            .arg(&page_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| IntakeError::OcrFailed {
                detail: format!("failed to run '{}': {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IntakeError::OcrFailed {
                detail: format!(
                    "'{}' exited with {}: {}",
                    self.binary,
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Run the OCR fallback over a document.
///
/// Rasterises **at most the first `max_ocr_pages` pages** and concatenates
/// the recognised text with a newline after each page. Returns the
/// concatenation regardless of whether any page yielded text.
pub async fn ocr_document(
    pdf_path: &Path,
    config: &IntakeConfig,
    recognizer: &Arc<dyn TextRecognizer>,
) -> Result<String, IntakeError> {
    info!("Starting OCR fallback (first {} pages)", config.max_ocr_pages);

    let rendered =
        render::render_page_prefix(pdf_path, config.max_ocr_pages, config.max_rendered_pixels)
            .await?;

    let mut ocr_text = String::new();
    for (idx, image) in &rendered {
        let text = recognizer.recognize(image).await?;
        debug!("Page {}: recognised {} characters", idx + 1, text.len());
        ocr_text.push_str(&text);
        ocr_text.push('\n');
    }

    info!("OCR complete: {} characters extracted", ocr_text.len());
    Ok(ocr_text)
}
