// ## 📂 File: `src/headers/decode.rs`
//! src/headers/decode.rs
//!
//! JSON -> `HeaderFieldSet`.
//!
//! Design notes:
//! - Values may be strings, numbers, booleans or null; all are stringified
//!   (`null` -> `""`, numbers with the same rules as float cells).
//! - Nested arrays/objects as values are rejected; there is no sensible text form.
//! - Decoding never sanitizes names. That is the builder's job.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::headers::types::{HeaderField, HeaderFieldSet};
use crate::source::coerce::format_float;
use crate::types::ConvertError;

/// Scalar JSON value -> text. `None` for arrays and objects.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(format_float)
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// serde helper for `HeaderField::value`.
pub(crate) fn value_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| serde::de::Error::custom("header field value must be a scalar"))
}

/// Decode either a list of `{name, value}` objects or a flat `{name: value}` map.
pub fn decode_header_fields(value: &Value) -> Result<HeaderFieldSet, ConvertError> {
    match value {
        Value::Null => Ok(HeaderFieldSet::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                HeaderField::deserialize(item)
                    .map_err(|e| ConvertError::InvalidRequest(format!("header_fields[{}]: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(HeaderFieldSet::from),
        Value::Object(map) => map
            .iter()
            .map(|(name, v)| {
                scalar_text(v)
                    .map(|text| HeaderField::new(name.clone(), text))
                    .ok_or_else(|| ConvertError::InvalidRequest(format!("header field '{}' must be a scalar", name)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(HeaderFieldSet::from),
        other => Err(ConvertError::InvalidRequest(format!(
            "header_fields must be a list or an object, got {}",
            json_type(other)
        ))),
    }
}

/// Parse a standalone JSON document of header fields.
pub fn parse_header_fields(json: &str) -> Result<HeaderFieldSet, ConvertError> {
    let value: Value = serde_json::from_str(json).map_err(|e| ConvertError::InvalidRequest(e.to_string()))?;
    decode_header_fields(&value)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_form_with_either_key_spelling() {
        let set = decode_header_fields(&json!([
            {"name": "Region", "value": "North West"},
            {"tagName": "Batch", "tagValue": 7},
        ]))
        .unwrap();
        assert_eq!(set.0, vec![HeaderField::new("Region", "North West"), HeaderField::new("Batch", "7")]);
    }

    #[test]
    fn map_form_keeps_insertion_order() {
        let set = parse_header_fields(r#"{"Zeta": 1.5, "Alpha": null, "Flag": true}"#).unwrap();
        let names: Vec<_> = set.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Flag"]);
        assert_eq!(set.0[0].value, "1.5");
        assert_eq!(set.0[1].value, "");
        assert_eq!(set.0[2].value, "true");
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(matches!(
            decode_header_fields(&json!({"a": [1, 2]})),
            Err(ConvertError::InvalidRequest(_))
        ));
        assert!(decode_header_fields(&json!([{"name": "a", "value": {"x": 1}}])).is_err());
        assert!(decode_header_fields(&json!("Region")).is_err());
    }

    #[test]
    fn missing_value_is_empty_text() {
        let set = decode_header_fields(&json!([{"name": "Note"}])).unwrap();
        assert_eq!(set.0[0].value, "");
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        assert!(matches!(parse_header_fields("{"), Err(ConvertError::InvalidRequest(_))));
    }
}
