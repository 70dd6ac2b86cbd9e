//! Drift detection
//!
//! The desired side is written out and read back before comparison, so both
//! sides pass through the same readers and pick up the same opaque defaults.
//! Both are then normalized with [`ServerDefaults`](panelsync_model::ServerDefaults)
//! and, when configured, stripped of server-assigned ids.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use panelsync_convert::ConverterRegistry;
use panelsync_model::{DashboardLayout, LayoutItem, Normalize, Panel, ServerAssigned};
use panelsync_value::Fingerprint;
use serde_json::Value;

use crate::config::ReconcileConfig;
use crate::error::{EntryError, ReconcileError};
use crate::pipeline::{write_layout, Converted, Unclassified};

/// Why one entry drifted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftReason {
    /// Both sides exist and differ after normalization
    Changed {
        /// Fingerprint of the normalized desired item
        desired: Fingerprint,
        /// Fingerprint of the normalized observed item
        observed: Fingerprint,
    },

    /// Desired entry has no stored counterpart
    Missing,

    /// Stored entry has no desired counterpart
    Unexpected,

    /// Stored entry could not be read
    Unreadable(String),
}

impl Display for DriftReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed { desired, observed } => write!(
                f,
                "changed (desired {}, observed {})",
                desired.short(),
                observed.short()
            ),
            Self::Missing => write!(f, "missing from stored dashboard"),
            Self::Unexpected => write!(f, "not in desired layout"),
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
        }
    }
}

/// Drift of one top-level entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDrift {
    /// Position shared by both sides
    pub index: usize,

    /// What differs
    pub reason: DriftReason,
}

/// Per-entry differences between a desired and a stored layout
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriftReport {
    /// Drifted entries in index order
    pub entries: Vec<EntryDrift>,
}

impl DriftReport {
    /// Check if no entry drifted
    #[inline]
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of drifted entries
    #[must_use]
    pub fn drifted_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.index).collect()
    }

    /// Drift of one entry
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DriftReason> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| &e.reason)
    }
}

fn fingerprint(item: &LayoutItem) -> Fingerprint {
    // Layout items hold only JSON-representable data.
    serde_json::to_value(item).map_or_else(|_| Fingerprint::default(), |v| Fingerprint::of_value(&v))
}

/// Compares desired values with stored JSON
#[derive(Debug, Clone, Copy)]
pub struct EquivalenceChecker<'a> {
    registry: &'a ConverterRegistry,
    config: &'a ReconcileConfig,
}

impl<'a> EquivalenceChecker<'a> {
    /// Create checker
    #[inline]
    #[must_use]
    pub fn new(registry: &'a ConverterRegistry, config: &'a ReconcileConfig) -> Self {
        Self { registry, config }
    }

    fn normalize(&self, mut item: LayoutItem) -> LayoutItem {
        item.apply_server_defaults(&self.config.defaults);
        if self.config.skip_server_ids {
            item.clear_server_ids();
        }
        item
    }

    /// Write one desired item and read it back
    ///
    /// # Errors
    /// - [`ReconcileError::Desired`] if either direction fails for the item
    /// - [`ReconcileError::Registry`] if the registry is broken
    pub fn round_trip(&self, desired: &LayoutItem) -> Result<LayoutItem, ReconcileError> {
        let layout = DashboardLayout::new().with_item(desired.clone());
        let written = write_layout(self.registry, &layout, true).map_err(|err| match err {
            ReconcileError::Entry(entry) => ReconcileError::Desired(entry.error),
            other => other,
        })?;

        let (mut read, errors) = Unclassified::from_value(&written.payload)?
            .classify()
            .convert(self.registry)?
            .into_parts();
        if let Some(EntryError { error, .. }) = errors.into_iter().next() {
            return Err(ReconcileError::Desired(error));
        }
        read.items.pop().ok_or_else(|| {
            ReconcileError::InvalidDocument("written entry was not read back".to_string())
        })
    }

    /// Read one stored entry; `None` if it cannot be read
    fn read_observed(&self, observed: &Value) -> Result<Option<LayoutItem>, ReconcileError> {
        let document = Value::Array(vec![observed.clone()]);
        let (mut read, errors) = Unclassified::from_value(&document)?
            .classify()
            .convert(self.registry)?
            .into_parts();
        if !errors.is_empty() {
            return Ok(None);
        }
        Ok(read.items.pop())
    }

    /// Check if a stored panel differs from the desired one
    ///
    /// A stored entry that cannot be read always needs an update.
    ///
    /// # Errors
    /// Propagates failures converting the desired panel
    pub fn needs_update(&self, desired: &Panel, observed: &Value) -> Result<bool, ReconcileError> {
        let desired = self.normalize(self.round_trip(&LayoutItem::Panel(desired.clone()))?);
        let Some(observed) = self.read_observed(observed)? else {
            tracing::debug!("observed panel unreadable, update needed");
            return Ok(true);
        };
        let observed = self.normalize(observed);
        let drifted = desired != observed;
        tracing::debug!(drifted, "panel compared");
        Ok(drifted)
    }

    /// Per-entry drift between a desired layout and a stored dashboard
    ///
    /// Entries are paired by position.
    ///
    /// # Errors
    /// - [`ReconcileError::Parse`] or [`ReconcileError::InvalidDocument`] if
    ///   the stored document is not a panel list
    /// - Failures converting the desired side
    pub fn diff(
        &self,
        desired: &DashboardLayout,
        observed: &Value,
    ) -> Result<DriftReport, ReconcileError> {
        let converted = Unclassified::from_value(observed)?
            .classify()
            .convert(self.registry)?;
        self.compare(desired, &converted)
    }

    pub(crate) fn compare(
        &self,
        desired: &DashboardLayout,
        observed: &Converted,
    ) -> Result<DriftReport, ReconcileError> {
        let items: BTreeMap<usize, &LayoutItem> =
            observed.items().iter().map(|(i, item)| (*i, item)).collect();
        let mut failures: BTreeMap<usize, &EntryError> = BTreeMap::new();
        for err in observed.errors() {
            failures.entry(err.location.index).or_insert(err);
        }

        let mut report = DriftReport::default();
        let len = desired.len().max(observed.total());
        for index in 0..len {
            let reason = match (desired.items.get(index), failures.get(&index)) {
                (None, _) => Some(DriftReason::Unexpected),
                (Some(_), Some(err)) => Some(DriftReason::Unreadable(err.error.to_string())),
                (Some(wanted), None) => match items.get(&index) {
                    None => Some(DriftReason::Missing),
                    Some(stored) => {
                        let wanted = self.normalize(self.round_trip(wanted)?);
                        let stored = self.normalize((*stored).clone());
                        (wanted != stored).then(|| DriftReason::Changed {
                            desired: fingerprint(&wanted),
                            observed: fingerprint(&stored),
                        })
                    }
                },
            };
            if let Some(reason) = reason {
                tracing::debug!(index, %reason, "entry drifted");
                report.entries.push(EntryDrift { index, reason });
            }
        }

        tracing::debug!(
            desired = desired.len(),
            observed = observed.total(),
            drifted = report.entries.len(),
            "drift computed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsync_model::{Grid, MarkdownConfig, Section};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn checker_config() -> ReconcileConfig {
        ReconcileConfig::default()
    }

    fn markdown(content: &str) -> Panel {
        Panel::new(Grid::at(0, 0), MarkdownConfig::new(content))
    }

    fn stored_markdown(content: &str) -> Value {
        json!({
            "type": "markdown",
            "uid": "srv-1",
            "grid": {"x": 0, "y": 0, "w": 24, "h": 15},
            "config": {"content": content, "hide_title": false}
        })
    }

    #[test]
    fn server_defaults_are_not_drift() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        assert!(!checker
            .needs_update(&markdown("# hi"), &stored_markdown("# hi"))
            .unwrap());
    }

    #[test]
    fn changed_content_is_drift() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        assert!(checker
            .needs_update(&markdown("# hi"), &stored_markdown("# bye"))
            .unwrap());
    }

    #[test]
    fn uid_compared_when_not_skipped() {
        let config = checker_config().with_skip_server_ids(false);
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        assert!(checker
            .needs_update(&markdown("# hi"), &stored_markdown("# hi"))
            .unwrap());
        assert!(!checker
            .needs_update(&markdown("# hi").with_uid("srv-1"), &stored_markdown("# hi"))
            .unwrap());
    }

    #[test]
    fn unreadable_observed_needs_update() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        let broken = json!({"type": "markdown", "grid": {"x": 0, "y": 0}, "config": "{oops"});
        assert!(checker.needs_update(&markdown("# hi"), &broken).unwrap());
    }

    #[test]
    fn contradictory_desired_propagates() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        let mistyped = markdown("# hi").with_panel_type("lens");
        let err = checker
            .needs_update(&mistyped, &stored_markdown("# hi"))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Desired(ref e) if e.is_contradiction()));
    }

    #[test]
    fn diff_pairs_by_position() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        let desired = DashboardLayout::new()
            .with_item(markdown("a"))
            .with_item(markdown("b"))
            .with_item(Section::new("Ops", 30));
        let observed = json!([
            stored_markdown("a"),
            stored_markdown("changed"),
        ]);
        let report = checker.diff(&desired, &observed).unwrap();
        assert!(!report.is_in_sync());
        assert_eq!(report.drifted_indices(), vec![1, 2]);
        assert!(matches!(report.get(1), Some(DriftReason::Changed { .. })));
        assert_eq!(report.get(2), Some(&DriftReason::Missing));
    }

    #[test]
    fn diff_reports_unexpected_and_unreadable() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        let desired = DashboardLayout::new().with_item(markdown("a"));
        let observed = json!([
            {"type": "markdown", "grid": {"x": 0, "y": 0}, "config": "{oops"},
            stored_markdown("extra"),
        ]);
        let report = checker.diff(&desired, &observed).unwrap();
        assert!(matches!(report.get(0), Some(DriftReason::Unreadable(_))));
        assert_eq!(report.get(1), Some(&DriftReason::Unexpected));
    }

    #[test]
    fn round_trip_sets_wire_type() {
        let config = checker_config();
        let checker = EquivalenceChecker::new(ConverterRegistry::standard(), &config);
        let LayoutItem::Panel(panel) = checker
            .round_trip(&LayoutItem::Panel(markdown("a")))
            .unwrap()
        else {
            panic!("expected panel");
        };
        assert_eq!(panel.panel_type.as_deref(), Some("markdown"));
    }
}
