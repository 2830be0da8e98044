//! Pipeline stages for contract intake.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (a different recogniser, a faked generation
//! service) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ gate ──▶ prompt ──▶ generate ──▶ parse ──▶ names
//! (pdfium)   (±ocr)   (template)  (LLM call)   (JSON)   (repair)
//! ```
//!
//! 1. [`extract`] — read the PDF text layer; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 2. [`gate`]    — score the digital text and escalate to OCR when it is
//!    near-empty or fails the vocabulary check
//! 3. [`render`] / [`ocr`] — the fallback path: rasterise a bounded page
//!    prefix and run the recognition capability over each image
//! 4. [`generate`] — the single generation-service call; the only stage
//!    with network I/O
//! 5. [`parse`]   — tolerant JSON recovery from the raw reply
//! 6. [`names`]   — evidence-based repair of truncated party names

pub mod extract;
pub mod gate;
pub mod generate;
pub mod names;
pub mod ocr;
pub mod parse;
pub mod render;
