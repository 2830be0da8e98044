//! Error types for the contract-intake library.
//!
//! Only two conditions are ever visible to a caller as a *diagnostic*
//! failure of an otherwise healthy request: the generation service returned
//! nothing ([`IntakeError::EmptyReply`]) or returned something no JSON
//! object could be recovered from ([`IntakeError::MalformedReply`]). Every
//! heuristic miss below those — a near-empty text layer, a garbled digital
//! extraction, a name the reconstruction pass could not improve — resolves
//! silently to a best-effort value and never aborts the request.
//!
//! The remaining variants are infrastructure faults (unreadable file, broken
//! PDF, OCR binary missing, HTTP failure) that stop the pipeline before a
//! record exists at all. Nothing here is process-fatal; every failure is
//! scoped to one request.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the contract-intake library.
#[derive(Debug, Error)]
pub enum IntakeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The recognition capability failed on a rendered page.
    ///
    /// An *empty* recognition result is not an error — scanned pages with no
    /// legible text simply contribute nothing. This variant covers the
    /// recogniser itself breaking (binary missing, non-zero exit).
    #[error("Text recognition failed: {detail}\nIs tesseract installed and on PATH?")]
    OcrFailed { detail: String },

    // ── Generation errors ─────────────────────────────────────────────────
    /// The generation service call itself failed (network, auth, non-2xx).
    #[error("Generation request failed: {detail}")]
    GenerationFailed { detail: String },

    /// The generation service answered but the reply carried no usable text.
    #[error("Generation service returned an empty reply")]
    EmptyReply,

    /// No JSON object could be recovered from the reply after the tolerant
    /// fallback chain. The raw reply rides along for manual inspection.
    #[error("No JSON object found in generation reply")]
    MalformedReply { raw: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntakeError {
    /// True for the two conditions a caller should surface as a diagnostic
    /// response with the offending material attached, rather than as a
    /// plain infrastructure failure.
    pub fn is_reply_failure(&self) -> bool {
        matches!(
            self,
            IntakeError::EmptyReply | IntakeError::MalformedReply { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_reply_keeps_raw_payload() {
        let e = IntakeError::MalformedReply {
            raw: "Sure! Here is the contract".into(),
        };
        match e {
            IntakeError::MalformedReply { raw } => {
                assert!(raw.contains("Sure!"));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn ocr_failed_display_mentions_tesseract() {
        let e = IntakeError::OcrFailed {
            detail: "No such file or directory".into(),
        };
        assert!(e.to_string().contains("tesseract"));
    }

    #[test]
    fn reply_failures_are_flagged() {
        assert!(IntakeError::EmptyReply.is_reply_failure());
        assert!(IntakeError::MalformedReply { raw: String::new() }.is_reply_failure());
        assert!(!IntakeError::Internal("x".into()).is_reply_failure());
    }

    #[test]
    fn not_a_pdf_display() {
        let e = IntakeError::NotAPdf {
            path: PathBuf::from("/tmp/upload.pdf"),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("/tmp/upload.pdf"));
    }
}
