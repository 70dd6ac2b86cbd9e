//! Reconciliation driver

use panelsync_convert::ConverterRegistry;
use panelsync_model::{DashboardLayout, Panel};
use serde_json::Value;

use crate::config::ReconcileConfig;
use crate::equivalence::{DriftReport, EquivalenceChecker};
use crate::error::{EntryError, ReconcileError};
use crate::pipeline::{write_layout, Reconciled, Unclassified, WriteOutcome};

/// Result of reading a stored dashboard
#[derive(Debug)]
pub struct ReadOutcome {
    /// Every entry that could be read, in stored order
    pub layout: DashboardLayout,

    /// Entries that could not be read
    pub errors: Vec<EntryError>,
}

impl ReadOutcome {
    /// Check if every entry was read
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Dashboard-level entry point
///
/// Holds no mutable state; one instance can serve many dashboards
/// concurrently.
///
/// # Example
///
/// ```rust
/// use panelsync_reconcile::Reconciler;
/// use serde_json::json;
///
/// let stored = json!([
///     {"type": "markdown", "grid": {"x": 0, "y": 0}, "config": {"content": "# a"}},
///     {"type": "markdown", "grid": {"x": 0, "y": 15}, "config": "{not json"},
/// ]);
/// let outcome = Reconciler::default().read(&stored).unwrap();
/// assert_eq!(outcome.layout.len(), 1);
/// assert_eq!(outcome.errors.len(), 1);
/// ```
#[derive(Debug)]
pub struct Reconciler<'r> {
    registry: &'r ConverterRegistry,
    config: ReconcileConfig,
}

impl Reconciler<'static> {
    /// Create reconciler over the standard registry
    #[inline]
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            registry: ConverterRegistry::standard(),
            config,
        }
    }
}

impl Default for Reconciler<'static> {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

impl<'r> Reconciler<'r> {
    /// Create reconciler over a custom registry
    #[inline]
    #[must_use]
    pub fn with_registry(registry: &'r ConverterRegistry, config: ReconcileConfig) -> Self {
        Self { registry, config }
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Converter registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'r ConverterRegistry {
        self.registry
    }

    /// Equivalence checker sharing this reconciler's registry and config
    #[inline]
    #[must_use]
    pub fn checker(&self) -> EquivalenceChecker<'_> {
        EquivalenceChecker::new(self.registry, &self.config)
    }

    /// Read a stored dashboard
    ///
    /// A bad entry never aborts the others; it is reported in
    /// [`ReadOutcome::errors`] and left out of the layout.
    ///
    /// # Errors
    /// - [`ReconcileError::InvalidDocument`] if the document is not a panel list
    /// - [`ReconcileError::Registry`] if the registry is broken
    pub fn read(&self, document: &Value) -> Result<ReadOutcome, ReconcileError> {
        let (layout, errors) = Unclassified::from_value(document)?
            .classify()
            .convert(self.registry)?
            .into_parts();
        tracing::debug!(items = layout.len(), errors = errors.len(), "dashboard read");
        Ok(ReadOutcome { layout, errors })
    }

    /// Read stored dashboard text
    ///
    /// # Errors
    /// Returns [`ReconcileError::Parse`] if the text is not JSON, otherwise
    /// as [`Reconciler::read`]
    pub fn read_panels_json(&self, text: &str) -> Result<ReadOutcome, ReconcileError> {
        let (layout, errors) = Unclassified::from_text(text)?
            .classify()
            .convert(self.registry)?
            .into_parts();
        tracing::debug!(items = layout.len(), errors = errors.len(), "dashboard read");
        Ok(ReadOutcome { layout, errors })
    }

    /// Write a desired layout
    ///
    /// # Errors
    /// - [`ReconcileError::Registry`] if the registry is broken
    /// - [`ReconcileError::Entry`] on the first entry error when
    ///   `fail_fast_on_write` is set
    pub fn write(&self, layout: &DashboardLayout) -> Result<WriteOutcome, ReconcileError> {
        write_layout(self.registry, layout, self.config.fail_fast_on_write)
    }

    /// Check if a stored panel differs from the desired one
    ///
    /// # Errors
    /// See [`EquivalenceChecker::needs_update`]
    pub fn needs_update(&self, desired: &Panel, observed: &Value) -> Result<bool, ReconcileError> {
        self.checker().needs_update(desired, observed)
    }

    /// Per-entry drift against a stored dashboard
    ///
    /// # Errors
    /// See [`EquivalenceChecker::diff`]
    pub fn diff(
        &self,
        desired: &DashboardLayout,
        observed: &Value,
    ) -> Result<DriftReport, ReconcileError> {
        self.checker().diff(desired, observed)
    }

    /// Run the full pipeline against a stored dashboard
    ///
    /// # Errors
    /// Document, registry and desired-side failures
    pub fn reconcile(
        &self,
        desired: &DashboardLayout,
        observed: &Value,
    ) -> Result<Reconciled, ReconcileError> {
        Unclassified::from_value(observed)?
            .classify()
            .convert(self.registry)?
            .reconcile(desired, &self.checker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsync_model::{Grid, MarkdownConfig, PanelConfig};
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_types_are_send_sync() {
        assert_send_sync::<Reconciler<'static>>();
        assert_send_sync::<EquivalenceChecker<'static>>();
        assert_send_sync::<ConverterRegistry>();
    }

    fn desired() -> DashboardLayout {
        DashboardLayout::new()
            .with_item(Panel::new(Grid::at(0, 0), MarkdownConfig::new("a")))
            .with_item(Panel::new(Grid::at(0, 15), PanelConfig::default()))
            .with_item(Panel::new(Grid::at(0, 30), MarkdownConfig::new("c")))
    }

    #[test]
    fn write_collects_entry_errors() {
        let outcome = Reconciler::default().write(&desired()).unwrap();
        assert_eq!(outcome.payload.as_array().map(Vec::len), Some(2));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].location.index, 1);
    }

    #[test]
    fn write_fail_fast_aborts() {
        let reconciler = Reconciler::new(ReconcileConfig::new().with_fail_fast_on_write(true));
        let err = reconciler.write(&desired()).unwrap_err();
        assert!(matches!(err, ReconcileError::Entry(ref e) if e.location.index == 1));
    }

    #[test]
    fn read_panels_json_rejects_text() {
        let err = Reconciler::default().read_panels_json("not json").unwrap_err();
        assert!(matches!(err, ReconcileError::Parse(_)));
    }

    #[test]
    fn reconcile_reports_sync() {
        let reconciler = Reconciler::default();
        let layout = DashboardLayout::new()
            .with_item(Panel::new(Grid::at(0, 0), MarkdownConfig::new("a")));
        let stored = reconciler.write(&layout).unwrap().payload;
        let reconciled = reconciler.reconcile(&layout, &stored).unwrap();
        assert!(reconciled.is_in_sync());
        assert_eq!(reconciled.observed.len(), 1);
        assert!(reconciled.errors.is_empty());
    }

    #[test]
    fn wrapped_document_is_accepted() {
        let stored = json!({"panels": [
            {"type": "markdown", "grid": {"x": 0, "y": 0}, "config": {"content": "a"}}
        ]});
        let outcome = Reconciler::default().read(&stored).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.layout.len(), 1);
    }
}
