//! Variant classifier
//!
//! Resolves which of several structurally overlapping shapes a JSON object
//! represents. Rules are evaluated in a fixed order and the first decisive rule wins:
//!
//! 1. **Discriminant**: a tag value owned by exactly one shape
//! 2. **Structural probes**, narrowing the candidate list in priority order:
//!    - (a) presence or absence of the query block
//!    - (b) key probes ([`Probe`]) a shape requires
//!    - (c) first successful decode in declared order (order-dependent, least reliable)
//! 3. Otherwise a [`ClassificationError`] naming every candidate
//!
//! Stage (c) only runs when (a) and (b) leave more than one candidate, or leave a
//! single candidate without having excluded anything.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ClassificationError;

/// Key of the query block inspected by stage (a)
pub const QUERY_KEY: &str = "query";

/// Last-resort decode predicate
///
/// Returns `true` if the value decodes into the shape.
pub type DecodeFn = fn(&Value) -> bool;

/// Expectation a shape places on the query block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryBlock {
    /// Query block must be present
    Required,

    /// Query block must be absent
    Forbidden,

    /// Shape does not care
    Unspecified,
}

impl QueryBlock {
    /// Check if a payload with or without a query block is admissible
    #[inline]
    #[must_use]
    pub fn admits(self, has_query: bool) -> bool {
        match self {
            Self::Required => has_query,
            Self::Forbidden => !has_query,
            Self::Unspecified => true,
        }
    }
}

/// Structural key probe, addressed by JSON pointer
///
/// A `null` value counts as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Pointer resolves to a non-null value
    Present(&'static str),

    /// Pointer does not resolve, or resolves to null
    Absent(&'static str),

    /// Pointer resolves to this string
    Equals(&'static str, &'static str),

    /// Pointer does not resolve to this string
    NotEquals(&'static str, &'static str),
}

impl Probe {
    /// Evaluate the probe against a value
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        let lookup = |pointer: &str| value.pointer(pointer).filter(|v| !v.is_null());
        match *self {
            Self::Present(pointer) => lookup(pointer).is_some(),
            Self::Absent(pointer) => lookup(pointer).is_none(),
            Self::Equals(pointer, expected) => {
                lookup(pointer).and_then(Value::as_str) == Some(expected)
            }
            Self::NotEquals(pointer, expected) => {
                lookup(pointer).and_then(Value::as_str) != Some(expected)
            }
        }
    }
}

/// One candidate shape
#[derive(Debug, Clone, Copy)]
pub struct Shape<K: 'static> {
    /// Kind reported when this shape is chosen
    pub kind: K,

    /// Name used in diagnostics
    pub name: &'static str,

    /// Discriminant values owned by this shape
    pub tags: &'static [&'static str],

    /// Query block expectation
    pub query: QueryBlock,

    /// Probes that must all hold
    pub probes: &'static [Probe],

    /// Last-resort decode predicate
    pub decode: Option<DecodeFn>,
}

/// Rule that decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Discriminant tag matched exactly one shape
    Discriminant,

    /// Query block presence excluded the other candidates
    QueryBlock,

    /// Key probes excluded the other candidates
    KeyProbe,

    /// First successful decode in declared order
    Decode,

    /// Only one candidate was ever possible
    SoleCandidate,
}

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<K> {
    /// Chosen kind
    pub kind: K,

    /// Name of the chosen shape
    pub shape: &'static str,

    /// Deciding rule
    pub rule: Rule,
}

/// Ordered classifier over a static set of shapes
///
/// Holds no mutable state; safe to share across threads.
pub struct Classifier<K: 'static> {
    name: &'static str,
    discriminant: Option<&'static str>,
    shapes: &'static [Shape<K>],
}

impl<K: Copy + fmt::Debug> Classifier<K> {
    /// Create classifier
    ///
    /// `shapes` order is the declared order used by the decode stage.
    #[must_use]
    pub const fn new(
        name: &'static str,
        discriminant: Option<&'static str>,
        shapes: &'static [Shape<K>],
    ) -> Self {
        Self {
            name,
            discriminant,
            shapes,
        }
    }

    /// Classifier name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Discriminant key, if any
    #[inline]
    #[must_use]
    pub fn discriminant(&self) -> Option<&'static str> {
        self.discriminant
    }

    /// Candidate shapes in declared order
    #[inline]
    #[must_use]
    pub fn shapes(&self) -> &'static [Shape<K>] {
        self.shapes
    }

    /// Candidate names in declared order
    #[must_use]
    pub fn candidate_names(&self) -> Vec<&'static str> {
        self.shapes.iter().map(|s| s.name).collect()
    }

    /// Classify a JSON value
    ///
    /// # Errors
    /// Returns [`ClassificationError`] if the value is not an object, if no
    /// candidate matches, or if several remain and none decodes
    pub fn classify(&self, value: &Value) -> Result<Classification<K>, ClassificationError> {
        let Some(object) = value.as_object() else {
            return Err(self.error(format!(
                "expected a JSON object, found {}",
                json_type(value)
            )));
        };

        if let Some(shape) = self.by_discriminant(object) {
            return Ok(self.decided(shape, Rule::Discriminant));
        }

        let mut remaining: Vec<&'static Shape<K>> = self.shapes.iter().collect();
        let mut rule = Rule::SoleCandidate;

        // (a) query block
        if remaining.iter().any(|s| s.query != QueryBlock::Unspecified) {
            let has_query = object.get(QUERY_KEY).is_some_and(|v| !v.is_null());
            let before = remaining.len();
            remaining.retain(|s| s.query.admits(has_query));
            if remaining.len() < before {
                rule = Rule::QueryBlock;
            }
        }

        // (b) key probes
        if remaining.iter().any(|s| !s.probes.is_empty()) {
            let before = remaining.len();
            remaining.retain(|s| s.probes.iter().all(|p| p.matches(value)));
            if remaining.len() < before {
                rule = Rule::KeyProbe;
            }
        }

        match remaining.as_slice() {
            [] => Err(self.error("no candidate matched the structural probes")),
            [only] if only.decode.is_none() || rule != Rule::SoleCandidate => {
                Ok(self.decided(*only, rule))
            }
            _ => {
                // (c) declared-order decode
                for shape in remaining.iter().copied() {
                    if shape.decode.is_some_and(|decode| decode(value)) {
                        return Ok(self.decided(shape, Rule::Decode));
                    }
                }
                let names: Vec<_> = remaining.iter().map(|s| s.name).collect();
                Err(self.error(format!(
                    "candidates {names:?} remain and none decodes the payload"
                )))
            }
        }
    }

    fn by_discriminant(&self, object: &Map<String, Value>) -> Option<&'static Shape<K>> {
        let key = self.discriminant?;
        let tag = object.get(key)?.as_str()?;
        let mut hits = self.shapes.iter().filter(|s| s.tags.contains(&tag));
        match (hits.next(), hits.next()) {
            (Some(shape), None) => Some(shape),
            _ => {
                tracing::trace!(
                    classifier = self.name,
                    tag,
                    "discriminant not decisive, probing structure"
                );
                None
            }
        }
    }

    fn decided(&self, shape: &'static Shape<K>, rule: Rule) -> Classification<K> {
        tracing::trace!(
            classifier = self.name,
            shape = shape.name,
            ?rule,
            "classified"
        );
        Classification {
            kind: shape.kind,
            shape: shape.name,
            rule,
        }
    }

    fn error(&self, reason: impl Into<String>) -> ClassificationError {
        ClassificationError::new(self.name, self.candidate_names(), reason)
    }
}

impl<K> fmt::Debug for Classifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("name", &self.name)
            .field("discriminant", &self.discriminant)
            .field("shapes", &self.shapes.iter().map(|s| s.name).collect::<Vec<_>>())
            .finish()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fruit {
        Apple,
        Pear,
        Plum,
    }

    fn has_stone(value: &Value) -> bool {
        value.get("stone").is_some_and(Value::is_boolean)
    }

    fn anything(_: &Value) -> bool {
        true
    }

    static FRUIT_SHAPES: [Shape<Fruit>; 3] = [
        Shape {
            kind: Fruit::Apple,
            name: "apple",
            tags: &["apple", "crab_apple"],
            query: QueryBlock::Unspecified,
            probes: &[Probe::Present("/core")],
            decode: None,
        },
        Shape {
            kind: Fruit::Plum,
            name: "plum",
            tags: &["plum"],
            query: QueryBlock::Unspecified,
            probes: &[Probe::Absent("/core")],
            decode: Some(has_stone),
        },
        Shape {
            kind: Fruit::Pear,
            name: "pear",
            tags: &["pear"],
            query: QueryBlock::Unspecified,
            probes: &[Probe::Absent("/core")],
            decode: Some(anything),
        },
    ];

    static FRUIT: Classifier<Fruit> = Classifier::new("fruit", Some("type"), &FRUIT_SHAPES);

    #[test]
    fn discriminant_fast_path() {
        let c = FRUIT.classify(&json!({"type": "crab_apple"})).unwrap();
        assert_eq!(c.kind, Fruit::Apple);
        assert_eq!(c.rule, Rule::Discriminant);
    }

    #[test]
    fn unknown_tag_falls_back_to_probes() {
        let c = FRUIT.classify(&json!({"type": "granny", "core": true})).unwrap();
        assert_eq!(c.kind, Fruit::Apple);
        assert_eq!(c.rule, Rule::KeyProbe);
    }

    #[test]
    fn decode_stage_uses_declared_order() {
        let c = FRUIT.classify(&json!({"stone": true})).unwrap();
        assert_eq!(c.kind, Fruit::Plum);
        assert_eq!(c.rule, Rule::Decode);

        let c = FRUIT.classify(&json!({"skin": "green"})).unwrap();
        assert_eq!(c.kind, Fruit::Pear);
        assert_eq!(c.rule, Rule::Decode);
    }

    #[test]
    fn non_object_is_error() {
        let err = FRUIT.classify(&json!([1, 2])).unwrap_err();
        assert_eq!(err.classifier, "fruit");
        assert!(err.reason.contains("an array"));
        assert_eq!(err.candidates, vec!["apple", "plum", "pear"]);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Source {
        Query,
        Computed,
    }

    static SOURCE_SHAPES: [Shape<Source>; 2] = [
        Shape {
            kind: Source::Query,
            name: "query",
            tags: &[],
            query: QueryBlock::Required,
            probes: &[],
            decode: None,
        },
        Shape {
            kind: Source::Computed,
            name: "computed",
            tags: &[],
            query: QueryBlock::Forbidden,
            probes: &[Probe::Equals("/dataset/type", "esql")],
            decode: None,
        },
    ];

    static SOURCE: Classifier<Source> = Classifier::new("source", None, &SOURCE_SHAPES);

    #[test]
    fn query_block_decides() {
        let c = SOURCE.classify(&json!({"query": {"query": ""}})).unwrap();
        assert_eq!(c.kind, Source::Query);
        assert_eq!(c.rule, Rule::QueryBlock);
    }

    #[test]
    fn null_query_counts_as_absent() {
        let c = SOURCE
            .classify(&json!({"query": null, "dataset": {"type": "esql"}}))
            .unwrap();
        assert_eq!(c.kind, Source::Computed);
    }

    #[test]
    fn probes_still_apply_after_query_stage() {
        let err = SOURCE
            .classify(&json!({"dataset": {"type": "dataView"}}))
            .unwrap_err();
        assert!(err.reason.contains("no candidate"));
    }

    #[test]
    fn ambiguous_without_decode_is_error() {
        static TWINS: [Shape<Source>; 2] = [
            Shape {
                kind: Source::Query,
                name: "left",
                tags: &[],
                query: QueryBlock::Unspecified,
                probes: &[Probe::Present("/a")],
                decode: None,
            },
            Shape {
                kind: Source::Computed,
                name: "right",
                tags: &[],
                query: QueryBlock::Unspecified,
                probes: &[Probe::Absent("/b")],
                decode: None,
            },
        ];
        static BOTH: Classifier<Source> = Classifier::new("twins", None, &TWINS);

        let err = BOTH.classify(&json!({"a": 1})).unwrap_err();
        assert!(err.reason.contains("none decodes"));
    }

    #[test]
    fn probe_semantics() {
        let value = json!({"dataset": {"type": "esql"}, "gone": null});
        assert!(Probe::Present("/dataset/type").matches(&value));
        assert!(Probe::Absent("/gone").matches(&value));
        assert!(Probe::Absent("/missing").matches(&value));
        assert!(Probe::Equals("/dataset/type", "esql").matches(&value));
        assert!(Probe::NotEquals("/dataset/type", "dataView").matches(&value));
        assert!(Probe::NotEquals("/missing", "esql").matches(&value));
    }
}
