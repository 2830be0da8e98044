//! Model reply parsing: recover a JSON record from an unreliable reply.
//!
//! The prompt demands strict JSON with no commentary and no fences, and the
//! generation service frequently returns prose-wrapped or fenced JSON
//! anyway. Rather than treat that as failure, this stage runs an ordered
//! fallback chain — each step a definite success/no-match, first success
//! wins:
//!
//! 1. Strip code-fence markers and trim.
//! 2. Parse the cleaned string as a single JSON object.
//! 3. Parse the greedy span from the first `{` to the last `}`.
//! 4. Fail with the raw reply attached for manual inspection.
//!
//! Only JSON well-formedness is enforced here. Missing schema fields are
//! the model's problem to have and downstream tooling's problem to
//! tolerate; a partially populated record is still a record.

use crate::error::IntakeError;
use crate::schema::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Code-fence markers, labelled or not. Removed wherever they occur rather
/// than matched as a balanced pair — replies have been observed with an
/// opening fence and no closing one.
static RE_FENCES: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?").unwrap());

/// Greedy first-`{`-to-last-`}` span. `(?s)` so the object may span lines.
static RE_OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Recover a [`Record`] from a raw generation reply.
///
/// # Errors
/// [`IntakeError::EmptyReply`] when the reply is empty or whitespace;
/// [`IntakeError::MalformedReply`] when no JSON object can be recovered,
/// with the raw reply as diagnostic payload.
pub fn parse_record(raw_reply: &str) -> Result<Record, IntakeError> {
    if raw_reply.trim().is_empty() {
        return Err(IntakeError::EmptyReply);
    }

    let cleaned = RE_FENCES.replace_all(raw_reply, "");
    let cleaned = cleaned.trim();

    if let Some(record) = parse_object(cleaned) {
        return Ok(record);
    }

    if let Some(span) = RE_OBJECT_SPAN.find(cleaned) {
        if let Some(record) = parse_object(span.as_str()) {
            return Ok(record);
        }
    }

    Err(IntakeError::MalformedReply {
        raw: raw_reply.to_string(),
    })
}

/// Parse a candidate string as a JSON object. Non-object values (a bare
/// array or string that happens to parse) are a no-match, not a record.
fn parse_object(candidate: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(Record::new(map)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_json_parses_unchanged() {
        let raw = r#"{"buyer_name": "John Hong", "purchase_price": "$450,000"}"#;
        let record = parse_record(raw).unwrap();
        assert_eq!(
            record.into_value(),
            serde_json::from_str::<Value>(raw).unwrap()
        );
    }

    #[test]
    fn fenced_reply_with_prose_is_recovered() {
        let raw = "Sure! ```json\n{\"buyer_name\":\"A\"}\n```";
        let record = parse_record(raw).unwrap();
        assert_eq!(record.into_value(), json!({"buyer_name": "A"}));
    }

    #[test]
    fn unlabelled_fences_are_stripped() {
        let raw = "```\n{\"seller_name\": \"B\"}\n```";
        let record = parse_record(raw).unwrap();
        assert_eq!(record.get_str("seller_name"), Some("B"));
    }

    #[test]
    fn object_embedded_in_prose_is_recovered() {
        let raw = "Here is the extraction you asked for:\n{\"buyer_name\": \"A\"}\nLet me know!";
        let record = parse_record(raw).unwrap();
        assert_eq!(record.get_str("buyer_name"), Some("A"));
    }

    #[test]
    fn greedy_span_keeps_nested_objects_intact() {
        let raw = "prefix {\"a\": {\"b\": 1}, \"tasks\": [\"x\"]} suffix";
        let record = parse_record(raw).unwrap();
        assert_eq!(record.into_value(), json!({"a": {"b": 1}, "tasks": ["x"]}));
    }

    #[test]
    fn empty_reply_is_its_own_condition() {
        assert!(matches!(parse_record(""), Err(IntakeError::EmptyReply)));
        assert!(matches!(parse_record("  \n "), Err(IntakeError::EmptyReply)));
    }

    #[test]
    fn unparseable_reply_carries_raw_payload() {
        match parse_record("not json at all") {
            Err(IntakeError::MalformedReply { raw }) => assert_eq!(raw, "not json at all"),
            other => panic!("expected MalformedReply, got {:?}", other.map(|r| r.into_value())),
        }
    }

    #[test]
    fn bare_array_is_not_a_record() {
        assert!(matches!(
            parse_record("[1, 2, 3]"),
            Err(IntakeError::MalformedReply { .. })
        ));
    }
}
