//! # contract-intake
//!
//! Parse real-estate purchase contracts (PDF) into structured records for
//! downstream transaction-management tooling.
//!
//! ## Why this crate?
//!
//! The hard part is not file handling — it is getting trustworthy
//! structured data out of documents and model replies that are both
//! unreliable. Scanned contracts have no text layer, damaged ones have a
//! garbled layer, and the extraction model wraps its JSON in prose and
//! truncates proper names at token boundaries. This crate is built around
//! four heuristics that absorb those failure modes:
//!
//! * a **quality gate** that scores the digital text layer and escalates
//!   to OCR only when it is near-empty or fails a vocabulary check
//! * a **prompt template** that pins the field schema and the
//!   anti-truncation rules the model is expected to follow
//! * a **tolerant reply parser** that recovers a JSON object from fenced
//!   or prose-wrapped replies before giving up
//! * a **name-reconstruction pass** that repairs truncated party names
//!   against the document text as ground truth
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract  read the text layer via pdfium (spawn_blocking)
//!  ├─ 2. Gate     near-empty or garbled? rasterise pages 1–5 and OCR them
//!  ├─ 3. Prompt   render the Form 21 field-extraction template
//!  ├─ 4. Generate one deterministic chat completion (no retry)
//!  ├─ 5. Parse    recover a JSON record from the raw reply
//!  └─ 6. Correct  repair truncated buyer/seller names from the source text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_intake::{parse_contract, IntakeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IntakeConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let record = parse_contract("contract.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `intake` binary (clap + anyhow + tracing-subscriber) |
//! | `server` | on      | `POST /intake` HTTP boundary (axum + tower-http) |
//!
//! Disable both when using only the library:
//! ```toml
//! contract-intake = { version = "0.3", default-features = false }
//! ```
//!
//! ## Capabilities
//!
//! OCR and text generation are consumed through the [`TextRecognizer`]
//! and [`TextGenerator`] traits. The shipped implementations shell out to
//! the Tesseract CLI and call the OpenAI chat-completions API; tests
//! inject deterministic fakes through [`IntakeConfig`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod prompts;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{IntakeConfig, IntakeConfigBuilder};
pub use error::IntakeError;
pub use intake::{extract_record, parse_contract, parse_contract_bytes};
pub use pipeline::gate::{TextOrigin, TextSource};
pub use pipeline::generate::TextGenerator;
pub use pipeline::ocr::TextRecognizer;
pub use schema::{Record, CONTRACT_FIELDS};
