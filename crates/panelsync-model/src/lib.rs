//! panelsync typed dashboard model
//!
//! The internal side of the panel mapping: strongly-typed records for every
//! visualization kind with a model, opaque values for the sub-objects that
//! are not worth typing, and the default rules the server applies on save.
//!
//! # Core Concepts
//!
//! - [`DashboardLayout`]: ordered [`LayoutItem`]s, each a [`Panel`] or a [`Section`]
//! - [`PanelConfig`]: one slot per typed kind plus an opaque passthrough slot
//! - [`charts`]: lens chart records, generic over the dataset variant
//! - [`defaults`]: default-population functions for opaque sub-objects
//! - [`ServerDefaults`]: server values for typed fields left unset
//!
//! # Example
//!
//! ```rust
//! use panelsync_model::{Grid, MarkdownConfig, Normalize, Panel, ServerDefaults};
//!
//! let panel = Panel::new(Grid::at(0, 0), MarkdownConfig::new("# Runbook"))
//!     .normalized(&ServerDefaults::default());
//! assert_eq!(panel.grid.w, Some(24));
//! assert_eq!(panel.panel_type.as_deref(), Some("markdown"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod charts;
mod config;
pub mod defaults;
mod layout;
mod markdown;
mod normalize;

pub use config::{PanelConfig, PanelSlot, LENS_PANEL_TYPE, MARKDOWN_PANEL_TYPE};
pub use defaults::OpaqueRole;
pub use layout::{DashboardLayout, Grid, LayoutItem, Panel, Section};
pub use markdown::MarkdownConfig;
pub use normalize::{Normalize, ServerAssigned, ServerDefaults};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
