//! panelsync opaque values
//!
//! Loosely-typed JSON sub-objects kept as canonical text instead of a typed model.
//!
//! # Core Concepts
//!
//! - [`OpaqueValue`]: canonical JSON text plus an optional default-population hook
//! - [`DefaultsFn`]: fills in fields the server always injects
//! - [`semantic_equals`]: equality that ignores key order, whitespace and server defaults
//! - [`Fingerprint`]: Blake3 digest of normalized text, used in logs and drift reports
//!
//! # Example
//!
//! ```rust
//! use panelsync_value::{semantic_equals, OpaqueValue};
//! use serde_json::{json, Value};
//!
//! fn number_format(value: &mut Value) {
//!     if let Some(map) = value.as_object_mut() {
//!         map.entry("format").or_insert_with(|| json!({"type": "number"}));
//!     }
//! }
//!
//! let desired = OpaqueValue::parse(r#"{"operation":"count"}"#, Some(number_format)).unwrap();
//! let observed = OpaqueValue::parse(
//!     r#"{ "format": {"type": "number"}, "operation": "count" }"#,
//!     None,
//! )
//! .unwrap();
//! assert!(semantic_equals(&desired, &observed));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod canonical;
mod error;
mod fingerprint;
mod opaque;

pub use canonical::{canonical_text, canonicalize, json_equivalent, parse_json};
pub use error::ParseError;
pub use fingerprint::Fingerprint;
pub use opaque::{insert_absent, normalize, semantic_equals, DefaultsFn, OpaqueValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
