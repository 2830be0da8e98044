//! Extraction quality gate: decide between the digital text layer and OCR.
//!
//! Digital extraction is cheap and usually right, but it cannot
//! self-diagnose its two failure modes: a pure-image scan yields a
//! near-empty text layer, and a damaged text layer yields characters that
//! decode fine yet resemble nothing a purchase contract says. The gate
//! classifies both with heuristics over the digital output and escalates to
//! the OCR fallback only then, rather than paying OCR latency on every
//! document.
//!
//! The decision is total and final for a request: once an origin is chosen,
//! downstream stages consume that text with no retry escalation.

use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::pipeline::extract;
use crate::pipeline::ocr::{self, TextRecognizer};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Below this many trimmed characters the text layer is treated as absent,
/// characteristic of a pure-image scan.
pub const MIN_DIGITAL_TEXT_LEN: usize = 100;

/// Fewer distinct vocabulary hits than this means the text layer is present
/// but likely garbled.
pub const MIN_VOCABULARY_HITS: usize = 2;

/// Words characteristic of the document class, matched as substrings of the
/// lowercased text. A text layer that mentions none of these is not a
/// readable purchase contract, whatever else it contains.
pub const CONTRACT_VOCABULARY: [&str; 7] = [
    "buyer",
    "seller",
    "agreement",
    "purchase",
    "date",
    "property",
    "contract",
];

/// Where the resolved document text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// Read directly from the PDF content stream.
    Digital,
    /// Recognised from rasterised page images.
    Ocr,
}

/// The document text handed to every downstream stage, tagged with how it
/// was obtained. Created once per request; the origin is final.
#[derive(Debug, Clone)]
pub struct TextSource {
    pub text: String,
    pub origin: TextOrigin,
}

/// Verdict on a digital extraction's usability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalQuality {
    /// Enough text, enough vocabulary: use it.
    Usable,
    /// Near-empty output — the extractor found no usable text layer.
    TooShort,
    /// Text is present but does not read like the expected document class.
    LowVocabulary,
}

/// Score a digital extraction without touching the document again.
///
/// Length is checked first: vocabulary counting over a near-empty string
/// proves nothing either way.
pub fn assess_digital_text(digital_text: &str) -> DigitalQuality {
    let clean = digital_text.trim();
    if clean.len() < MIN_DIGITAL_TEXT_LEN {
        return DigitalQuality::TooShort;
    }

    let lowered = clean.to_lowercase();
    let hits = CONTRACT_VOCABULARY
        .iter()
        .filter(|word| lowered.contains(*word))
        .count();

    if hits < MIN_VOCABULARY_HITS {
        DigitalQuality::LowVocabulary
    } else {
        DigitalQuality::Usable
    }
}

/// Resolve the document text, escalating to OCR when the digital layer
/// fails its plausibility checks.
///
/// Deterministic given the digital-extraction output: the same bytes
/// always resolve to the same origin.
pub async fn resolve_text(
    pdf_path: &Path,
    config: &IntakeConfig,
    recognizer: &Arc<dyn TextRecognizer>,
) -> Result<TextSource, IntakeError> {
    let digital_text = extract::extract_digital_text(pdf_path).await?;

    match assess_digital_text(&digital_text) {
        DigitalQuality::Usable => Ok(TextSource {
            text: digital_text,
            origin: TextOrigin::Digital,
        }),
        verdict => {
            info!("Digital text unusable ({:?}), escalating to OCR", verdict);
            let text = ocr::ocr_document(pdf_path, config, recognizer).await?;
            Ok(TextSource {
                text,
                origin: TextOrigin::Ocr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_rejected_regardless_of_vocabulary() {
        // Every vocabulary word present, still under the length floor.
        let text = "buyer seller agreement purchase date property contract";
        assert!(text.trim().len() < MIN_DIGITAL_TEXT_LEN);
        assert_eq!(assess_digital_text(text), DigitalQuality::TooShort);
    }

    #[test]
    fn empty_and_whitespace_are_too_short() {
        assert_eq!(assess_digital_text(""), DigitalQuality::TooShort);
        assert_eq!(assess_digital_text("   \n\t  "), DigitalQuality::TooShort);
    }

    #[test]
    fn noisy_text_with_two_hits_passes() {
        let noise = "x7#@!".repeat(40);
        let text = format!("{noise} BUYER shall deliver to the Seller {noise}");
        assert_eq!(assess_digital_text(&text), DigitalQuality::Usable);
    }

    #[test]
    fn long_garbage_without_vocabulary_is_low_vocabulary() {
        let text = "t\n\r\n%%&(".repeat(60);
        assert!(text.trim().len() >= MIN_DIGITAL_TEXT_LEN);
        assert_eq!(assess_digital_text(&text), DigitalQuality::LowVocabulary);
    }

    #[test]
    fn one_distinct_hit_is_not_enough() {
        // "buyer" repeated still counts as a single vocabulary hit.
        let text = "buyer ".repeat(40);
        assert_eq!(assess_digital_text(&text), DigitalQuality::LowVocabulary);
    }

    #[test]
    fn hits_match_case_insensitively_as_substrings() {
        let filler = "lorem ipsum dolor sit amet ".repeat(5);
        let text = format!("{filler}the PURCHASER's PROPERTY and the closing DATE");
        // "purchase" and "property" and "date" all hit as substrings.
        assert_eq!(assess_digital_text(&text), DigitalQuality::Usable);
    }
}
