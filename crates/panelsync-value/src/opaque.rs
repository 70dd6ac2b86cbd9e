//! Opaque values
//!
//! A sub-object that is not worth fully typing is stored as canonical JSON text,
//! together with the function that fills in what the server injects on save.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::canonical::{canonical_text, canonicalize, json_equivalent, parse_json};
use crate::error::ParseError;
use crate::fingerprint::Fingerprint;

/// Default-population hook
///
/// # Contract
/// - Only inserts fields that are absent
/// - Idempotent: applying it twice equals applying it once
pub type DefaultsFn = fn(&mut Value);

/// Normalize raw JSON text
///
/// Parses `raw`, applies `defaults` if given, and re-serializes with sorted keys.
///
/// # Errors
/// Returns [`ParseError`] if `raw` is not valid JSON
pub fn normalize(raw: &str, defaults: Option<DefaultsFn>) -> Result<String, ParseError> {
    let mut value = parse_json(raw)?;
    if let Some(apply) = defaults {
        apply(&mut value);
    }
    Ok(canonical_text(&value))
}

/// Semantic equality of two opaque values
///
/// Each side is normalized with its own default-population function before the
/// parsed structures are compared. Key order and whitespace never matter.
#[must_use]
pub fn semantic_equals(a: &OpaqueValue, b: &OpaqueValue) -> bool {
    json_equivalent(&a.normalized_value(), &b.normalized_value())
}

/// Insert `value` under `key` unless the key is already present
///
/// Helper for writing [`DefaultsFn`] implementations.
pub fn insert_absent(map: &mut Map<String, Value>, key: &str, value: Value) {
    if !map.contains_key(key) {
        map.insert(key.to_string(), value);
    }
}

/// Canonical JSON text plus an optional default-population function
///
/// # Invariants
/// - `text` is always the canonical serialization of `value`
/// - Equality (`==`) is [`semantic_equals`], never textual
#[derive(Clone)]
pub struct OpaqueValue {
    value: Value,
    text: String,
    defaults: Option<DefaultsFn>,
}

impl OpaqueValue {
    /// Create from a JSON value without defaults
    #[inline]
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self::from_value(value, None)
    }

    /// Create from a JSON value
    #[must_use]
    pub fn from_value(value: Value, defaults: Option<DefaultsFn>) -> Self {
        let value = canonicalize(&value);
        let text = canonical_text(&value);
        Self {
            value,
            text,
            defaults,
        }
    }

    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns [`ParseError`] carrying `text` if it is not valid JSON
    #[inline]
    pub fn parse(text: &str, defaults: Option<DefaultsFn>) -> Result<Self, ParseError> {
        let value = parse_json(text)?;
        Ok(Self::from_value(value, defaults))
    }

    /// Attach a default-population function
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: DefaultsFn) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Canonical text of the value as given (defaults not applied)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Value as given (defaults not applied)
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Attached default-population function
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> Option<DefaultsFn> {
        self.defaults
    }

    /// Check if a default-population function is attached
    #[inline]
    #[must_use]
    pub fn has_defaults(&self) -> bool {
        self.defaults.is_some()
    }

    /// Value with defaults applied, keys sorted
    #[must_use]
    pub fn normalized_value(&self) -> Value {
        match self.defaults {
            Some(apply) => {
                let mut value = self.value.clone();
                apply(&mut value);
                canonicalize(&value)
            }
            None => self.value.clone(),
        }
    }

    /// Canonical text with defaults applied
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> String {
        canonical_text(&self.normalized_value())
    }

    /// Value to send to the server
    ///
    /// Includes every field the default-population function supplies.
    #[inline]
    #[must_use]
    pub fn to_wire(&self) -> Value {
        self.normalized_value()
    }

    /// Digest of the normalized text
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self.normalized().as_bytes())
    }

    /// Semantic equality, see [`semantic_equals`]
    #[inline]
    #[must_use]
    pub fn semantic_eq(&self, other: &Self) -> bool {
        semantic_equals(self, other)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        semantic_equals(self, other)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("text", &self.text)
            .field("has_defaults", &self.has_defaults())
            .finish()
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Value> for OpaqueValue {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for OpaqueValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OpaqueValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}
