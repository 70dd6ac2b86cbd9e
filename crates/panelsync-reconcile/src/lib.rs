//! panelsync reconciliation engine
//!
//! Reads one stored dashboard into a typed layout, writes a desired layout back
//! to stored form, and decides whether the two have drifted apart.
//!
//! # Core Concepts
//!
//! - [`Reconciler`]: the entry point, bound to a registry and a [`ReconcileConfig`]
//! - [`pipeline`]: the `Unclassified -> Classified -> Converted -> Reconciled` stages
//! - [`EquivalenceChecker`]: round-trip comparison that ignores server defaults
//! - [`EntryError`]: a per-entry failure reported next to the partial result
//!
//! # Example
//!
//! ```rust
//! use panelsync_model::{DashboardLayout, Grid, MarkdownConfig, Panel};
//! use panelsync_reconcile::Reconciler;
//! use serde_json::json;
//!
//! let desired = Panel::new(Grid::at(0, 0), MarkdownConfig::new("# Runbook"));
//! let stored = json!({
//!     "type": "markdown",
//!     "uid": "a1b2",
//!     "grid": {"x": 0, "y": 0, "w": 24, "h": 15},
//!     "config": {"content": "# Runbook", "hide_title": false}
//! });
//!
//! let reconciler = Reconciler::default();
//! assert!(!reconciler.needs_update(&desired, &stored).unwrap());
//!
//! let layout = DashboardLayout::new().with_item(desired);
//! assert!(reconciler.diff(&layout, &json!([stored])).unwrap().is_in_sync());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod equivalence;
mod error;
pub mod pipeline;
mod reconciler;

pub use config::{ReconcileConfig, MAX_PANEL_WIDTH};
pub use equivalence::{DriftReason, DriftReport, EntryDrift, EquivalenceChecker};
pub use error::{ConfigError, EntryError, EntryLocation, ReconcileError};
pub use pipeline::{Reconciled, Stage, WriteOutcome};
pub use reconciler::{ReadOutcome, Reconciler};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
