//! panelsync converter registry
//!
//! Maps one panel's stored JSON (`type` + `config`) to the typed
//! [`PanelConfig`](panelsync_model::PanelConfig) and back.
//!
//! # Core Concepts
//!
//! - [`PanelConverter`]: ownership predicates plus the two mapping functions
//! - [`ConverterRegistry`]: ordered dispatch with a passthrough fallback
//! - [`converters`]: markdown, the lens chart family and the passthrough
//! - [`wire`]: path-aware readers and writers shared by the converters
//!
//! # Example
//!
//! ```rust
//! use panelsync_convert::{ConverterRegistry, PanelPayload};
//! use serde_json::json;
//!
//! let payload = PanelPayload::new("markdown", json!({"content": "# Runbook"}));
//! let converted = ConverterRegistry::standard()
//!     .convert_in(&payload)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(converted.kind, "markdown");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod converter;
pub mod converters;
mod error;
mod payload;
mod registry;
pub mod wire;

pub use converter::PanelConverter;
pub use error::{ConvertError, DispatchError, RegistryError};
pub use payload::PanelPayload;
pub use registry::{ConverterRegistry, Converted};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
