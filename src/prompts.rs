//! Prompt templates for contract field extraction.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the field section is rendered from
//!    [`crate::schema::CONTRACT_FIELDS`], so the prompt and the documented
//!    output shape cannot drift apart.
//!
//! 2. **Testability** — unit tests inspect the rendered prompt directly
//!    without a live generation service, making template regressions easy
//!    to catch.
//!
//! Everything in this template is a contract on the generation service's
//! *expected* behaviour, not an enforced invariant. The tolerant reply
//! parser and the name-reconstruction pass exist precisely because the
//! service does not always comply.

use crate::schema::CONTRACT_FIELDS;

/// System instruction sent with every extraction request.
///
/// Reinforces the anti-truncation directive outside the user prompt; the
/// most common corruption observed in replies is a proper name cut short
/// at a token boundary.
pub const SYSTEM_PROMPT: &str = "Return ALL characters exactly as written in the PDF. \
DO NOT truncate, shorten, or alter names or addresses.";

/// Render the extraction prompt around the resolved document text.
///
/// The template instructs the model to act as a Washington Form 21 parser,
/// return strict JSON with no commentary or fences, preserve characters
/// verbatim and reconstruct names broken across line wraps, include only
/// explicitly checked items in `included_items`, and append a derived
/// `tasks` checklist. The document text goes at the end so a long document
/// cannot push the instructions out of the model's attention window.
pub fn build_prompt(document_text: &str) -> String {
    let mut fields = String::new();
    for name in CONTRACT_FIELDS {
        if name == "included_items" {
            fields.push_str("- included_items (as an array of strings, only those checked/selected)\n");
        } else {
            fields.push_str("- ");
            fields.push_str(name);
            fields.push('\n');
        }
    }

    format!(
        r#"You are a real estate contract parser specializing in Washington State Form 21 Purchase & Sale Agreements.

Extract ONLY the requested fields below from the raw text.
Return PERFECT valid JSON. No commentary. No markdown. No code fences.
Return ALL characters exactly as written in the PDF. DO NOT truncate, shorten, or alter names or addresses. If a name appears broken across lines or partially cut (e.g., "Kimberly Hon"), reconstruct the full name from the text (e.g., "Kimberly Hong"). Never drop the last characters of names.

For included_items: include ONLY items that are explicitly checked/selected/marked as included in the document. Do NOT include unchecked, blank, or unselected items.

Fields to extract:
{fields}
After extracting fields, generate a "tasks" array, where each task is a simple string:
"tasks": [
  "Verify buyer name: {{buyer_name}}",
  "Verify earnest money: {{earnest_money_amount}} due {{earnest_money_delivery_date}}",
  ... and so on for key milestones
]

Return ONLY valid JSON with the fields listed above.

Document text:
{document_text}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_schema_field() {
        let p = build_prompt("irrelevant");
        for name in CONTRACT_FIELDS {
            assert!(p.contains(name), "prompt is missing field '{name}'");
        }
    }

    #[test]
    fn prompt_embeds_document_text_at_the_end() {
        let p = build_prompt("THE DOCUMENT BODY");
        assert!(p.trim_end().ends_with("THE DOCUMENT BODY"));
    }

    #[test]
    fn prompt_carries_anti_truncation_and_strict_json_directives() {
        let p = build_prompt("x");
        assert!(p.contains("DO NOT truncate"));
        assert!(p.contains("No code fences"));
        assert!(p.contains("only those checked/selected"));
    }

    #[test]
    fn system_prompt_reinforces_verbatim_output() {
        assert!(SYSTEM_PROMPT.contains("exactly as written"));
    }
}
