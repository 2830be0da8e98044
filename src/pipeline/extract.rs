//! Digital text extraction: read the machine-encoded text layer via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread so the Tokio workers never stall on CPU-bound PDF
//! parsing.
//!
//! This stage makes no judgement about the text it returns. Pure-image
//! scans yield an empty or near-empty string and garbled text layers yield
//! garbage; classifying either is the quality gate's job.

use crate::error::IntakeError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Pull the text layer from every page, concatenated in page order.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// A page without a readable text layer contributes nothing rather than
/// failing the document.
pub async fn extract_digital_text(pdf_path: &Path) -> Result<String, IntakeError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_digital_text_blocking(&path))
        .await
        .map_err(|e| IntakeError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of text-layer extraction.
fn extract_digital_text_blocking(pdf_path: &Path) -> Result<String, IntakeError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| IntakeError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    debug!("PDF loaded for text extraction: {} pages", total_pages);

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(page_text) => text.push_str(&page_text.all()),
            Err(e) => {
                // No text layer on this page. Common for scans; the gate
                // escalates to OCR when too little accumulates overall.
                warn!("Page {}: no readable text layer ({:?})", idx + 1, e);
            }
        }
    }

    debug!("Digital extraction produced {} characters", text.len());
    Ok(text)
}
