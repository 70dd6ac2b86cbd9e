//! Converter trait
//!
//! One converter per visualization kind. Converters are stateless and shared
//! across threads through the registry.

use std::fmt::Debug;

use panelsync_model::PanelConfig;

use crate::error::ConvertError;
use crate::payload::PanelPayload;

/// Bidirectional mapping for one visualization kind
///
/// # Contract
/// - `convert_in` is total over every payload `owns_external` accepts:
///   unexpected shapes surface as classification errors, malformed leaves as
///   parse or conversion errors, never as a panic
/// - `convert_in(convert_out(c))` equals `c` for every config `owns_internal` accepts
pub trait PanelConverter: Send + Sync + Debug {
    /// Visualization kind this converter owns (`metric`, `markdown`, ...)
    fn kind(&self) -> &'static str;

    /// Wire panel type it produces (`lens`, `markdown`, ...)
    fn panel_type(&self) -> &'static str;

    /// Does this converter own the external payload
    fn owns_external(&self, payload: &PanelPayload) -> bool;

    /// Does this converter own the internal config
    fn owns_internal(&self, config: &PanelConfig) -> bool;

    /// External to internal
    ///
    /// # Errors
    /// Returns [`ConvertError`] if the payload cannot be converted
    fn convert_in(&self, payload: &PanelPayload) -> Result<PanelConfig, ConvertError>;

    /// Internal to external
    ///
    /// `panel_type` is the type stated on the panel, if any.
    ///
    /// # Errors
    /// Returns [`ConvertError`] if the config cannot be converted
    fn convert_out(
        &self,
        config: &PanelConfig,
        panel_type: Option<&str>,
    ) -> Result<PanelPayload, ConvertError>;

    /// Catch-all converter tried after every other one
    fn is_fallback(&self) -> bool {
        false
    }
}
