//! PDF rasterisation: render a bounded page prefix to `DynamicImage`s.
//!
//! Only the OCR fallback path renders anything, and it never needs more
//! than the first few pages, so this stage takes an explicit page cap
//! rather than a page selection. The pixel cap bounds memory the same way
//! regardless of physical page size: an oversized scan is scaled down, not
//! allocated at full resolution.

use crate::error::IntakeError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise at most the first `max_pages` pages of a PDF.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples in page order.
pub async fn render_page_prefix(
    pdf_path: &Path,
    max_pages: usize,
    max_pixels: u32,
) -> Result<Vec<(usize, DynamicImage)>, IntakeError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || render_page_prefix_blocking(&path, max_pages, max_pixels))
        .await
        .map_err(|e| IntakeError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of prefix rendering.
fn render_page_prefix_blocking(
    pdf_path: &Path,
    max_pages: usize,
    max_pixels: u32,
) -> Result<Vec<(usize, DynamicImage)>, IntakeError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| IntakeError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let page_count = total_pages.min(max_pages);
    info!(
        "Rasterising pages 1–{} of {} for OCR",
        page_count, total_pages
    );

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(page_count);

    for idx in 0..page_count {
        let page = pages
            .get(idx as u16)
            .map_err(|e| IntakeError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            IntakeError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}
