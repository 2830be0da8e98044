//! Intake orchestration: one PDF in, one corrected record out.
//!
//! Data flows strictly forward — Document → TextSource → Prompt →
//! ModelReply → Record → CorrectedRecord — and every value is created and
//! destroyed within a single request; nothing is cached across calls.
//! Suspension points exist only at the OCR and generation capabilities;
//! there is no mid-pipeline abort path and no retry of the generation
//! call.
//!
//! Temporary-resource ownership lives here: the bytes entry point writes
//! the upload to a scoped temp file and releases it on every exit path,
//! with release failures logged rather than allowed to mask the request's
//! primary result.

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::pipeline::gate::{self, TextSource};
use crate::pipeline::generate::{OpenAiGenerator, TextGenerator};
use crate::pipeline::names;
use crate::pipeline::ocr::{TesseractRecognizer, TextRecognizer};
use crate::pipeline::parse;
use crate::prompts;
use crate::schema::Record;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parse a contract PDF on disk into a corrected [`Record`].
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Infrastructure faults (unreadable file, broken PDF, OCR or HTTP
/// failure) and the two diagnostic reply failures
/// ([`IntakeError::EmptyReply`], [`IntakeError::MalformedReply`]).
/// Heuristic misses — OCR escalation, name reconstruction finding nothing
/// — never surface as errors.
pub async fn parse_contract(
    pdf_path: impl AsRef<Path>,
    config: &IntakeConfig,
) -> Result<Record, IntakeError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    info!("Starting intake: {}", pdf_path.display());

    // ── Step 1: Validate the input file ──────────────────────────────────
    validate_pdf_file(pdf_path)?;

    // ── Step 2: Resolve capabilities ─────────────────────────────────────
    let recognizer = resolve_recognizer(config);
    let generator = resolve_generator(config)?;

    // ── Step 3: Resolve document text (quality gate, OCR fallback) ───────
    let resolve_start = Instant::now();
    let source = gate::resolve_text(pdf_path, config, &recognizer).await?;
    info!(
        "Text resolved via {:?}: {} characters in {}ms",
        source.origin,
        source.text.len(),
        resolve_start.elapsed().as_millis()
    );

    // ── Step 4: Generate, parse, correct ─────────────────────────────────
    let record = extract_record(&source, &generator).await?;

    info!(
        "Intake complete: {} fields in {}ms",
        record.as_map().len(),
        total_start.elapsed().as_millis()
    );

    Ok(record)
}

/// Parse contract PDF bytes in memory.
///
/// Writes `bytes` to a managed temp file for the duration of the request —
/// pdfium needs a file-system path — and removes it on all exit paths,
/// including failures. This is the entry point the HTTP boundary uses.
pub async fn parse_contract_bytes(
    bytes: &[u8],
    config: &IntakeConfig,
) -> Result<Record, IntakeError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| IntakeError::Internal(format!("tempfile: {}", e)))?;
    tmp.write_all(bytes)
        .map_err(|e| IntakeError::Internal(format!("tempfile write: {}", e)))?;

    let result = parse_contract(tmp.path(), config).await;

    // Release failures are logged, never allowed to mask the result.
    if let Err(e) = tmp.close() {
        warn!("Failed to remove intake temp file: {}", e);
    }

    result
}

/// Run the text-level half of the pipeline: prompt → reply → record →
/// name corrections.
///
/// Split out from [`parse_contract`] so it can be exercised against a
/// resolved [`TextSource`] and a faked generator without pdfium.
pub async fn extract_record(
    source: &TextSource,
    generator: &Arc<dyn TextGenerator>,
) -> Result<Record, IntakeError> {
    let prompt = prompts::build_prompt(&source.text);
    debug!("Prompt rendered: {} characters", prompt.len());

    let gen_start = Instant::now();
    let reply = generator.generate(prompts::SYSTEM_PROMPT, &prompt).await?;
    info!(
        "Generation reply: {} characters in {}ms",
        reply.len(),
        gen_start.elapsed().as_millis()
    );

    let mut record = parse::parse_record(&reply)?;
    names::apply_name_corrections(&mut record, &source.text);

    Ok(record)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Validate existence, readability, and PDF magic bytes before pdfium
/// ever sees the file, so callers get a meaningful error rather than a
/// pdfium crash report.
fn validate_pdf_file(path: &Path) -> Result<(), IntakeError> {
    use std::io::Read;

    if !path.exists() {
        return Err(IntakeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(IntakeError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(IntakeError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(IntakeError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Use the injected recogniser when one was provided, else the Tesseract
/// CLI configured by the intake config.
fn resolve_recognizer(config: &IntakeConfig) -> Arc<dyn TextRecognizer> {
    match &config.recognizer {
        Some(recognizer) => Arc::clone(recognizer),
        None => Arc::new(TesseractRecognizer::from_config(config)),
    }
}

/// Use the injected generator when one was provided, else build the
/// OpenAI-backed one from the injected credential.
fn resolve_generator(config: &IntakeConfig) -> Result<Arc<dyn TextGenerator>, IntakeError> {
    match &config.generator {
        Some(generator) => Ok(Arc::clone(generator)),
        None => Ok(Arc::new(OpenAiGenerator::from_config(config)?)),
    }
}
