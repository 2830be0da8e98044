//! Configuration for contract intake.
//!
//! All pipeline behaviour is controlled through [`IntakeConfig`], built via
//! its [`IntakeConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests and to construct fully-faked
//! pipelines in tests.
//!
//! The generation-service credential is an explicit field here rather than
//! an ambient environment lookup inside the pipeline: the binary resolves
//! `OPENAI_API_KEY` exactly once at process start and hands it in, so the
//! core stays free of process-global state.
//!
//! The quality-gate thresholds are deliberately *not* here — they live as
//! constants in [`crate::pipeline::gate`]. The gate's decision must be
//! deterministic for a given extraction output, and the credential is the
//! only externally tunable value the intake contract admits.

use crate::error::IntakeError;
use crate::pipeline::generate::TextGenerator;
use crate::pipeline::ocr::TextRecognizer;
use std::fmt;
use std::sync::Arc;

/// Configuration for one intake pipeline.
///
/// Built via [`IntakeConfig::builder()`].
///
/// # Example
/// ```rust
/// use contract_intake::IntakeConfig;
///
/// let config = IntakeConfig::builder()
///     .api_key("sk-...")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct IntakeConfig {
    /// Credential for the generation service. Resolved once at process
    /// start and injected; required unless a pre-built `generator` is set.
    pub api_key: String,

    /// Base URL of the generation service API. Default: OpenAI.
    pub api_base: String,

    /// Model identity for field extraction. Default: "gpt-4o-mini".
    ///
    /// Fixed per deployment, not per request — extraction quality is tuned
    /// against one model's failure modes (the name-truncation artefact the
    /// correction stage repairs is model-specific behaviour).
    pub model: String,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Deterministic sampling is part of the generation contract: the same
    /// document should yield the same record, and the tolerant parser is
    /// easier to reason about when the reply shape doesn't wander.
    pub temperature: f32,

    /// Maximum tokens the model may generate per reply. Default: 4096.
    ///
    /// A full twenty-field record plus tasks rarely exceeds 1 000 tokens,
    /// but setting this low truncates the JSON mid-object and turns a good
    /// reply into a malformed one.
    pub max_tokens: usize,

    /// Per-call timeout for the generation request in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Upper bound on pages fed to OCR. Default: 5.
    ///
    /// OCR is materially slower than reading the text layer, and the fields
    /// worth extracting live in the opening pages; later pages hold
    /// signatures and exhibits. Bounding the prefix trades that recall for
    /// latency and memory.
    pub max_ocr_pages: usize,

    /// Maximum rendered image dimension (width or height) in pixels when
    /// rasterising pages for OCR. Default: 2000.
    ///
    /// Caps either dimension regardless of physical page size so pdfium
    /// never allocates unbounded pixel buffers for oversized scans.
    pub max_rendered_pixels: u32,

    /// Path to the tesseract binary. Default: "tesseract" (relies on PATH).
    pub tesseract_path: String,

    /// Recognition language passed to tesseract. Default: "eng".
    pub ocr_language: String,

    /// Pre-built generation capability. Takes precedence over `api_key`;
    /// used by tests to run the pipeline against a deterministic fake.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Pre-built recognition capability. Replaces the tesseract CLI.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            api_timeout_secs: 60,
            max_ocr_pages: 5,
            max_rendered_pixels: 2000,
            tesseract_path: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            generator: None,
            recognizer: None,
        }
    }
}

impl fmt::Debug for IntakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_ocr_pages", &self.max_ocr_pages)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("tesseract_path", &self.tesseract_path)
            .field("ocr_language", &self.ocr_language)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"))
            .finish()
    }
}

impl IntakeConfig {
    /// Create a new builder for `IntakeConfig`.
    pub fn builder() -> IntakeConfigBuilder {
        IntakeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`IntakeConfig`].
#[derive(Debug)]
pub struct IntakeConfigBuilder {
    config: IntakeConfig,
}

impl IntakeConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_ocr_pages(mut self, n: usize) -> Self {
        self.config.max_ocr_pages = n.max(1);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<IntakeConfig, IntakeError> {
        let c = &self.config;
        if c.max_ocr_pages == 0 {
            return Err(IntakeError::InvalidConfig(
                "max_ocr_pages must be ≥ 1".into(),
            ));
        }
        if c.api_base.is_empty() {
            return Err(IntakeError::InvalidConfig("api_base must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_intake_contract() {
        let c = IntakeConfig::default();
        assert_eq!(c.model, "gpt-4o-mini");
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.max_ocr_pages, 5);
        assert_eq!(c.tesseract_path, "tesseract");
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = IntakeConfig::builder()
            .temperature(7.5)
            .max_ocr_pages(0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_ocr_pages, 1);
    }

    #[test]
    fn debug_never_prints_the_credential() {
        let c = IntakeConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{:?}", c);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
