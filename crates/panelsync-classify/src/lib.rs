//! panelsync variant classifier
//!
//! Picks exactly one shape for a JSON object when several candidate shapes
//! overlap structurally and no single tag reliably tells them apart.
//!
//! # Core Concepts
//!
//! - [`Classifier`]: ordered rules over a static list of [`Shape`]s
//! - [`Probe`]: JSON-pointer key checks used by the structural stage
//! - [`Classification`]: chosen kind plus the [`Rule`] that decided it
//! - [`shapes`]: the built-in shape sets for dashboard JSON
//!
//! # Example
//!
//! ```rust
//! use panelsync_classify::shapes::{SourceKind, CHART_SOURCE};
//! use serde_json::json;
//!
//! let attrs = json!({"type": "metric", "dataset": {"type": "esql", "query": "FROM logs"}});
//! let chosen = CHART_SOURCE.classify(&attrs).unwrap();
//! assert_eq!(chosen.kind, SourceKind::Esql);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod classifier;
mod error;
pub mod shapes;

pub use classifier::{
    Classification, Classifier, DecodeFn, Probe, QueryBlock, Rule, Shape, QUERY_KEY,
};
pub use error::ClassificationError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
