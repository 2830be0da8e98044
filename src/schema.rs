//! The contract field schema and the extracted [`Record`].
//!
//! The schema is a compile-time constant, not data: the same ordered list
//! renders the field section of the prompt and documents the shape callers
//! can expect back. The record itself stays deliberately loose — a JSON
//! object as the generation service returned it. The parser guarantees
//! well-formedness only; schema completeness is the model's job, and
//! downstream tooling is expected to tolerate missing keys.

use serde::Serialize;
use serde_json::{Map, Value};

/// Field the correction stage rewrites for the buyer party.
pub const FIELD_BUYER_NAME: &str = "buyer_name";

/// Field the correction stage rewrites for the seller party.
pub const FIELD_SELLER_NAME: &str = "seller_name";

/// The twenty contract fields requested from the generation service, in
/// prompt order. `included_items` is an array of strings; everything else
/// is a plain string.
pub const CONTRACT_FIELDS: [&str; 20] = [
    FIELD_BUYER_NAME,
    FIELD_SELLER_NAME,
    "property_address",
    "property_city",
    "property_state",
    "property_zip",
    "purchase_price",
    "earnest_money_amount",
    "earnest_money_delivery_date",
    "contract_date",
    "effective_date",
    "closing_date",
    "possession_date",
    "title_insurance_company",
    "closing_agent_company",
    "closing_agent_name",
    "information_verification_period",
    "included_items",
    "buyer_signed_date",
    "seller_signed_date",
];

/// Key of the derived checklist appended after the contract fields.
pub const FIELD_TASKS: &str = "tasks";

/// A structured record recovered from one generation reply.
///
/// Wraps the reply's JSON object. Keys may be missing and extra keys are
/// tolerated; the `included_items` and `tasks` arrays pass through exactly
/// as generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap a parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// A field's value, if present and a non-empty string.
    ///
    /// Non-string values (arrays, numbers the model emitted despite the
    /// prompt) read as absent here; the raw value is still in the record.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Overwrite a field with a string value.
    pub fn set_str(&mut self, field: &str, value: impl Into<String>) {
        self.fields
            .insert(field.to_string(), Value::String(value.into()));
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record, yielding the JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => Record::new(m),
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn schema_has_twenty_fields_in_prompt_order() {
        assert_eq!(CONTRACT_FIELDS.len(), 20);
        assert_eq!(CONTRACT_FIELDS[0], FIELD_BUYER_NAME);
        assert_eq!(CONTRACT_FIELDS[19], "seller_signed_date");
    }

    #[test]
    fn get_str_ignores_missing_empty_and_non_string() {
        let r = record(json!({
            "buyer_name": "John Hong",
            "seller_name": "",
            "included_items": ["Refrigerator"],
        }));
        assert_eq!(r.get_str(FIELD_BUYER_NAME), Some("John Hong"));
        assert_eq!(r.get_str(FIELD_SELLER_NAME), None);
        assert_eq!(r.get_str("included_items"), None);
        assert_eq!(r.get_str("closing_date"), None);
    }

    #[test]
    fn set_str_overwrites_in_place() {
        let mut r = record(json!({"buyer_name": "John Hon"}));
        r.set_str(FIELD_BUYER_NAME, "John Hong");
        assert_eq!(r.get_str(FIELD_BUYER_NAME), Some("John Hong"));
    }

    #[test]
    fn serialises_transparently() {
        let r = record(json!({"buyer_name": "A", "tasks": ["Verify buyer name: A"]}));
        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(out, json!({"buyer_name": "A", "tasks": ["Verify buyer name: A"]}));
    }
}
