//! Engine configuration

use panelsync_model::ServerDefaults;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Widest panel the dashboard grid allows
pub const MAX_PANEL_WIDTH: i64 = 48;

/// Reconciliation settings
///
/// # Example
///
/// ```rust
/// use panelsync_reconcile::ReconcileConfig;
///
/// let config = ReconcileConfig::from_toml_str(
///     r#"
///     fail_fast_on_write = true
///
///     [defaults]
///     panel_height = 10
///     "#,
/// )
/// .unwrap();
/// assert!(config.fail_fast_on_write);
/// assert_eq!(config.defaults.panel_height, 10);
/// assert_eq!(config.defaults.panel_width, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Abort `write` on the first entry error instead of collecting
    pub fail_fast_on_write: bool,

    /// Ignore server-assigned `uid`s when comparing
    pub skip_server_ids: bool,

    /// Server values for unset typed fields
    pub defaults: ServerDefaults,
}

impl ReconcileConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate from TOML
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the TOML is malformed or a value is out of range
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = &self.defaults;
        if !(1..=MAX_PANEL_WIDTH).contains(&defaults.panel_width) {
            return Err(ConfigError::invalid(
                "defaults.panel_width",
                format!(
                    "must be within 1..={MAX_PANEL_WIDTH}, got {}",
                    defaults.panel_width
                ),
            ));
        }
        if defaults.panel_height < 1 {
            return Err(ConfigError::invalid(
                "defaults.panel_height",
                format!("must be at least 1, got {}", defaults.panel_height),
            ));
        }
        if !(defaults.sampling > 0.0 && defaults.sampling <= 1.0) {
            return Err(ConfigError::invalid(
                "defaults.sampling",
                format!("must be within (0, 1], got {}", defaults.sampling),
            ));
        }
        if defaults.query_language.is_empty() {
            return Err(ConfigError::invalid("defaults.query_language", "must not be empty"));
        }
        Ok(())
    }

    /// With fail-fast writing
    #[inline]
    #[must_use]
    pub fn with_fail_fast_on_write(mut self, enabled: bool) -> Self {
        self.fail_fast_on_write = enabled;
        self
    }

    /// With server-id skipping
    #[inline]
    #[must_use]
    pub fn with_skip_server_ids(mut self, enabled: bool) -> Self {
        self.skip_server_ids = enabled;
        self
    }

    /// With server defaults
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: ServerDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fail_fast_on_write: false,
            skip_server_ids: true,
            defaults: ServerDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ReconcileConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.skip_server_ids);
        assert!(!config.fail_fast_on_write);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            ReconcileConfig::from_toml_str("").unwrap(),
            ReconcileConfig::default()
        );
    }

    #[test]
    fn out_of_range_width_rejected() {
        let err = ReconcileConfig::from_toml_str("[defaults]\npanel_width = 60\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "defaults.panel_width", .. }
        ));
    }

    #[test]
    fn zero_sampling_rejected() {
        let config = ReconcileConfig::new().with_defaults(ServerDefaults {
            sampling: 0.0,
            ..ServerDefaults::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = ReconcileConfig::from_toml_str("fail_fast_on_write = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn builders() {
        let config = ReconcileConfig::new()
            .with_fail_fast_on_write(true)
            .with_skip_server_ids(false);
        assert!(config.fail_fast_on_write);
        assert!(!config.skip_server_ids);
    }
}
