//! CLI binary for contract-intake.
//!
//! A thin shim over the library crate: `parse` runs one document through
//! the pipeline and prints the record, `serve` exposes the HTTP boundary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contract_intake::{parse_contract, server, IntakeConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse one contract to stdout
  intake parse contract.pdf

  # Serve the intake endpoint
  intake serve --addr 0.0.0.0:8600

  # Upload against a running server
  curl -F file=@contract.pdf http://localhost:8600/intake

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY     Generation-service credential (required)
  INTAKE_MODEL       Override the extraction model (default: gpt-4o-mini)
  INTAKE_TESSERACT   Path to the tesseract binary (default: tesseract)
  PDFIUM_LIB_PATH    Path to an existing libpdfium

SETUP:
  1. Install tesseract:  apt-get install tesseract-ocr  (or brew install tesseract)
  2. Set the API key:    export OPENAI_API_KEY=sk-...
  3. Parse:              intake parse contract.pdf
"#;

/// Parse real-estate purchase contracts into structured records.
#[derive(Parser, Debug)]
#[command(
    name = "intake",
    version,
    about = "Parse real-estate purchase contracts (PDF) into structured records",
    long_about = "Parse real-estate purchase contracts (Washington Form 21) into structured \
records plus a follow-up task checklist. Reads the PDF text layer, falls back to OCR for \
scans, extracts fields through a language model, and repairs truncated names against the \
document text.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Generation-service credential. Resolved once at startup.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Extraction model identity.
    #[arg(long, env = "INTAKE_MODEL", default_value = "gpt-4o-mini", global = true)]
    model: String,

    /// Path to the tesseract binary used for the OCR fallback.
    #[arg(long, env = "INTAKE_TESSERACT", default_value = "tesseract", global = true)]
    tesseract: String,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single contract PDF and print the record as JSON.
    Parse {
        /// Path to the contract PDF.
        pdf: PathBuf,
    },
    /// Serve POST /intake over HTTP.
    Serve {
        /// Address to bind.
        #[arg(long, env = "INTAKE_ADDR", default_value = "127.0.0.1:8600")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Config: the credential is injected here, once, at process start ──
    let api_key = cli
        .api_key
        .clone()
        .context("No generation credential found. Set OPENAI_API_KEY or pass --api-key.")?;

    let config = IntakeConfig::builder()
        .api_key(api_key)
        .model(&cli.model)
        .tesseract_path(&cli.tesseract)
        .build()
        .context("Invalid configuration")?;

    match cli.command {
        Command::Parse { pdf } => {
            let record = parse_contract(&pdf, &config)
                .await
                .with_context(|| format!("Intake failed for {}", pdf.display()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&record).context("Failed to serialise record")?
            );
        }
        Command::Serve { addr } => {
            server::serve(config, addr).await.context("Server failed")?;
        }
    }

    Ok(())
}
