//! Canonical JSON helpers
//!
//! Deterministic key ordering and deep comparison for `serde_json::Value`.

use serde_json::{Map, Value};

use crate::error::ParseError;

/// Parse JSON text, surfacing the offending text on failure
///
/// # Errors
/// Returns [`ParseError`] if `text` is not valid JSON
#[inline]
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(|e| ParseError::from_json(&e, text))
}

/// Rebuild a value with object keys in sorted order, recursively
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                if let Some(val) = map.get(key) {
                    sorted.insert(key.clone(), canonicalize(val));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact JSON text with sorted keys
#[must_use]
pub fn canonical_text(value: &Value) -> String {
    // Serializing a Value into a String cannot fail
    serde_json::to_string(&canonicalize(value)).unwrap_or_default()
}

/// Deep structural equality
///
/// Key order is irrelevant and numbers compare by value, so `1` equals `1.0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn json_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y
                || match (x.as_f64(), y.as_f64()) {
                    (Some(p), Some(q)) => p == q,
                    _ => false,
                }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equivalent(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| json_equivalent(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_text_sorts_keys() {
        let value = json!({"b": 1, "a": {"d": [1, {"z": 0, "y": 1}], "c": null}});
        assert_eq!(
            canonical_text(&value),
            r#"{"a":{"c":null,"d":[1,{"y":1,"z":0}]},"b":1}"#
        );
    }

    #[test]
    fn canonical_text_escapes_strings() {
        let value = json!({"quote": "say \"hi\""});
        let text = canonical_text(&value);
        assert_eq!(parse_json(&text).unwrap(), value);
    }

    #[test]
    fn equivalent_ignores_number_representation() {
        assert!(json_equivalent(&json!({"sampling": 1}), &json!({"sampling": 1.0})));
        assert!(!json_equivalent(&json!({"sampling": 1}), &json!({"sampling": 0.5})));
    }

    #[test]
    fn equivalent_requires_same_keys() {
        assert!(!json_equivalent(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equivalent(&json!({"a": 1, "b": 2}), &json!({"a": 1})));
    }

    #[test]
    fn equivalent_array_order_matters() {
        assert!(!json_equivalent(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn parse_json_keeps_offending_text() {
        let err = parse_json("{not json").unwrap_err();
        assert_eq!(err.text, "{not json");
    }
}
