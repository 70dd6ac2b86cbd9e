//! Staged reconciliation pipeline
//!
//! One stored dashboard moves through
//! `Unclassified -> Classified -> Converted -> Reconciled`. Each stage is its
//! own type, consumed by the next transition, so a stage can never be re-run.
//! Entry-local failures ride along in every stage; only document and registry
//! faults abort.

use panelsync_classify::shapes::{ItemKind, LAYOUT_ITEM, SECTION_ITEM};
use panelsync_classify::Classification;
use panelsync_convert::wire::{Fields, ObjectBuilder};
use panelsync_convert::{
    ConvertError, ConverterRegistry, DispatchError, PanelPayload, RegistryError,
};
use panelsync_model::{DashboardLayout, Grid, LayoutItem, Panel, Section};
use panelsync_value::parse_json;
use serde_json::Value;

use crate::equivalence::{DriftReport, EquivalenceChecker};
use crate::error::{EntryError, EntryLocation, ReconcileError};

/// Key holding the panel list in a dashboard object
pub const PANELS_KEY: &str = "panels";

/// Path reported for errors about a whole entry
const ENTRY_PATH: &str = "entry";

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raw stored entries
    Unclassified,

    /// Each entry tagged with its item kind
    Classified,

    /// Each entry converted to a layout item
    Converted,

    /// Compared against a desired layout
    Reconciled,
}

/// Validates a stage transition
///
/// # Errors
/// Returns [`ReconcileError::IllegalTransition`] unless `to` directly follows `from`
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), ReconcileError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(ReconcileError::IllegalTransition { from, to })
    }
}

/// Stages reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: Stage) -> Vec<Stage> {
    use Stage::{Classified, Converted, Reconciled, Unclassified};
    match from {
        Unclassified => vec![Classified],
        Classified => vec![Converted],
        Converted => vec![Reconciled],
        Reconciled => vec![],
    }
}

fn allowed(from: Stage, to: Stage) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

fn log_stage(from: Stage, to: Stage, entries: usize, errors: usize) {
    tracing::debug!(?from, ?to, entries, errors, "pipeline stage complete");
}

fn advance(from: Stage, to: Stage, entries: usize, errors: usize) -> Result<(), ReconcileError> {
    validate_transition(from, to)?;
    log_stage(from, to, entries, errors);
    Ok(())
}

fn capture(errors: &mut Vec<EntryError>, location: EntryLocation, error: ConvertError) {
    let err = EntryError::new(location, error);
    tracing::warn!(location = %err.location, error = %err.error, "entry skipped");
    errors.push(err);
}

/// Stored dashboard entries before classification
#[derive(Debug, Clone, PartialEq)]
pub struct Unclassified {
    entries: Vec<Value>,
}

impl Unclassified {
    /// Stage of this value
    pub const STAGE: Stage = Stage::Unclassified;

    /// Accept a panel list, or an object with a `panels` list
    ///
    /// # Errors
    /// Returns [`ReconcileError::InvalidDocument`] for any other shape
    pub fn from_value(document: &Value) -> Result<Self, ReconcileError> {
        let list = match document {
            Value::Array(items) => items,
            Value::Object(map) => match map.get(PANELS_KEY) {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(ReconcileError::InvalidDocument(format!(
                        "`{PANELS_KEY}` must be an array"
                    )))
                }
                None => {
                    return Err(ReconcileError::InvalidDocument(format!(
                        "object has no `{PANELS_KEY}` array"
                    )))
                }
            },
            _ => {
                return Err(ReconcileError::InvalidDocument(
                    "expected an array of panels".to_string(),
                ))
            }
        };
        Ok(Self {
            entries: list.clone(),
        })
    }

    /// Parse stored text, then [`Unclassified::from_value`]
    ///
    /// # Errors
    /// Returns [`ReconcileError::Parse`] if the text is not JSON
    pub fn from_text(text: &str) -> Result<Self, ReconcileError> {
        Self::from_value(&parse_json(text)?)
    }

    /// Number of top-level entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tag every entry with its kind
    ///
    /// Entries that match no item shape are captured as errors.
    #[must_use]
    pub fn classify(self) -> Classified {
        let total = self.entries.len();
        let mut items = Vec::with_capacity(total);
        let mut errors = Vec::new();

        for (index, value) in self.entries.into_iter().enumerate() {
            match classify_item(index, value, &mut errors) {
                Ok(item) => items.push((index, item)),
                Err(error) => capture(&mut errors, EntryLocation::item(index), error),
            }
        }

        log_stage(Self::STAGE, Classified::STAGE, items.len(), errors.len());
        Classified {
            total,
            items,
            errors,
        }
    }
}

/// One panel entry, split into raw parts
#[derive(Debug, Clone, PartialEq)]
pub struct RawPanel {
    /// The whole stored entry
    pub value: Value,

    /// Wire panel type
    pub panel_type: String,

    /// Config object, parsed if it was stored as text
    pub config: Value,
}

/// One section entry with its classified children
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    /// The whole stored entry
    pub value: Value,

    /// Children that classified, with their index in the section
    pub panels: Vec<(usize, RawPanel)>,
}

/// A classified top-level entry
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedItem {
    /// Panel entry
    Panel(RawPanel),

    /// Section entry
    Section(RawSection),
}

fn trace_classification(location: EntryLocation, chosen: &Classification<ItemKind>) {
    tracing::trace!(
        %location,
        kind = ?chosen.kind,
        shape = chosen.shape,
        rule = ?chosen.rule,
        "classified entry"
    );
}

fn classify_item(
    index: usize,
    value: Value,
    errors: &mut Vec<EntryError>,
) -> Result<ClassifiedItem, ConvertError> {
    let chosen = LAYOUT_ITEM
        .classify(&value)
        .map_err(|err| ConvertError::classification(ENTRY_PATH, err))?;
    trace_classification(EntryLocation::item(index), &chosen);

    match chosen.kind {
        ItemKind::Panel => Ok(ClassifiedItem::Panel(split_panel(value)?)),
        ItemKind::Section => {
            let mut panels = Vec::new();
            for (child, (path, raw)) in Fields::new(&value, "")?
                .list(PANELS_KEY)?
                .into_iter()
                .enumerate()
            {
                let location = EntryLocation::child(index, child);
                match classify_child(location, &path, raw) {
                    Ok(panel) => panels.push((child, panel)),
                    Err(error) => capture(errors, location, error),
                }
            }
            Ok(ClassifiedItem::Section(RawSection { value, panels }))
        }
    }
}

fn classify_child(
    location: EntryLocation,
    path: &str,
    value: &Value,
) -> Result<RawPanel, ConvertError> {
    let chosen = SECTION_ITEM
        .classify(value)
        .map_err(|err| ConvertError::classification(path, err))?;
    trace_classification(location, &chosen);
    split_panel(value.clone())
}

fn split_panel(value: Value) -> Result<RawPanel, ConvertError> {
    let fields = Fields::new(&value, "")?;
    let panel_type = fields.req_str("type")?;
    let config = match fields.get("config") {
        Some(Value::String(text)) => parse_json(text)?,
        Some(other) => other.clone(),
        None => return Err(ConvertError::conversion("config", "required field is missing")),
    };
    Ok(RawPanel {
        value,
        panel_type,
        config,
    })
}

/// Entries tagged with their kind
#[derive(Debug)]
pub struct Classified {
    total: usize,
    items: Vec<(usize, ClassifiedItem)>,
    errors: Vec<EntryError>,
}

impl Classified {
    /// Stage of this value
    pub const STAGE: Stage = Stage::Classified;

    /// Entries that classified, with their document index
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[(usize, ClassifiedItem)] {
        &self.items
    }

    /// Errors captured so far
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// Convert every entry through the registry
    ///
    /// # Errors
    /// Returns [`ReconcileError::Registry`] if the registry is broken; entry
    /// failures are captured instead
    pub fn convert(self, registry: &ConverterRegistry) -> Result<Converted, ReconcileError> {
        let Self {
            total,
            items: classified,
            mut errors,
        } = self;
        let mut items = Vec::with_capacity(classified.len());

        for (index, item) in classified {
            let converted = match item {
                ClassifiedItem::Panel(raw) => {
                    read_panel(registry, &raw).map(LayoutItem::Panel)
                }
                ClassifiedItem::Section(raw) => {
                    read_section(registry, index, &raw, &mut errors).map(LayoutItem::Section)
                }
            };
            match converted {
                Ok(item) => items.push((index, item)),
                Err(DispatchError::Entry(error)) => {
                    capture(&mut errors, EntryLocation::item(index), error);
                }
                Err(DispatchError::Registry(defect)) => return Err(defect.into()),
            }
        }

        advance(Self::STAGE, Converted::STAGE, items.len(), errors.len())?;
        Ok(Converted {
            total,
            items,
            errors,
        })
    }
}

fn read_grid(fields: Fields<'_>) -> Result<Grid, ConvertError> {
    let grid = fields.req_object("grid", "grid")?;
    Ok(Grid {
        x: grid.req_i64("x")?,
        y: grid.req_i64("y")?,
        w: grid.opt_i64("w")?,
        h: grid.opt_i64("h")?,
    })
}

fn read_panel(registry: &ConverterRegistry, raw: &RawPanel) -> Result<Panel, DispatchError> {
    let fields = Fields::new(&raw.value, "")?;
    let grid = read_grid(fields)?;
    let uid = fields.opt_str("uid")?;

    let payload = PanelPayload::new(raw.panel_type.clone(), raw.config.clone());
    let converted = registry
        .convert_in(&payload)?
        .ok_or_else(|| RegistryError::Unowned(format!("{} payload", raw.panel_type)))?;
    tracing::trace!(kind = converted.kind, panel_type = %converted.panel_type, "panel converted");

    Ok(Panel {
        uid,
        grid,
        panel_type: Some(converted.panel_type),
        config: converted.config,
    })
}

fn read_section(
    registry: &ConverterRegistry,
    index: usize,
    raw: &RawSection,
    errors: &mut Vec<EntryError>,
) -> Result<Section, DispatchError> {
    let fields = Fields::new(&raw.value, "")?;
    let y = fields.req_object("grid", "grid")?.req_i64("y")?;
    let mut section = Section {
        uid: fields.opt_str("uid")?,
        title: fields.req_str("title")?,
        collapsed: fields.opt_bool("collapsed")?,
        y,
        panels: Vec::with_capacity(raw.panels.len()),
    };

    for (child, panel) in &raw.panels {
        match read_panel(registry, panel) {
            Ok(panel) => section.panels.push(panel),
            Err(DispatchError::Entry(error)) => {
                capture(errors, EntryLocation::child(index, *child), error);
            }
            Err(registry_defect) => return Err(registry_defect),
        }
    }
    Ok(section)
}

/// Entries converted to layout items
#[derive(Debug)]
pub struct Converted {
    total: usize,
    items: Vec<(usize, LayoutItem)>,
    errors: Vec<EntryError>,
}

impl Converted {
    /// Stage of this value
    pub const STAGE: Stage = Stage::Converted;

    /// Number of top-level entries in the stored document
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Converted items with their document index
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[(usize, LayoutItem)] {
        &self.items
    }

    /// Errors captured so far
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// Split into the partial layout and the captured errors
    #[must_use]
    pub fn into_parts(self) -> (DashboardLayout, Vec<EntryError>) {
        let items = self.items.into_iter().map(|(_, item)| item).collect();
        (DashboardLayout { items }, self.errors)
    }

    /// Compare against a desired layout
    ///
    /// # Errors
    /// Propagates failures converting the desired side
    pub fn reconcile(
        self,
        desired: &DashboardLayout,
        checker: &EquivalenceChecker<'_>,
    ) -> Result<Reconciled, ReconcileError> {
        let drift = checker.compare(desired, &self)?;
        advance(
            Self::STAGE,
            Reconciled::STAGE,
            self.items.len(),
            drift.entries.len(),
        )?;
        let (observed, errors) = self.into_parts();
        Ok(Reconciled {
            observed,
            errors,
            drift,
        })
    }
}

/// Terminal stage: observed layout plus its drift from the desired one
#[derive(Debug)]
pub struct Reconciled {
    /// Best-effort observed layout
    pub observed: DashboardLayout,

    /// Entries that could not be read
    pub errors: Vec<EntryError>,

    /// Differences from the desired layout
    pub drift: DriftReport,
}

impl Reconciled {
    /// Stage of this value
    pub const STAGE: Stage = Stage::Reconciled;

    /// Check if nothing needs to be written
    #[inline]
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.drift.is_in_sync()
    }
}

/// Result of writing a desired layout
#[derive(Debug)]
pub struct WriteOutcome {
    /// Stored panel list, failed entries left out
    pub payload: Value,

    /// Entries that could not be written
    pub errors: Vec<EntryError>,
}

impl WriteOutcome {
    /// Check if every entry was written
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

fn write_grid(grid: &Grid) -> Value {
    ObjectBuilder::new()
        .set("x", grid.x)
        .set("y", grid.y)
        .set_opt("w", grid.w)
        .set_opt("h", grid.h)
        .build()
}

/// Write one panel entry
pub(crate) fn write_panel(
    registry: &ConverterRegistry,
    panel: &Panel,
) -> Result<Value, DispatchError> {
    let payload = registry.convert_out(panel)?.ok_or_else(|| {
        let slots: Vec<_> = panel
            .config
            .populated_slots()
            .iter()
            .map(|slot| slot.name())
            .collect();
        RegistryError::Unowned(format!("{} config", slots.join(", ")))
    })?;
    Ok(ObjectBuilder::new()
        .set("type", payload.panel_type)
        .set_opt("uid", panel.uid.clone())
        .set("grid", write_grid(&panel.grid))
        .set("config", payload.config)
        .build())
}

struct Writer<'a> {
    registry: &'a ConverterRegistry,
    fail_fast: bool,
    errors: Vec<EntryError>,
}

impl Writer<'_> {
    fn panel(
        &mut self,
        location: EntryLocation,
        panel: &Panel,
    ) -> Result<Option<Value>, ReconcileError> {
        match write_panel(self.registry, panel) {
            Ok(value) => Ok(Some(value)),
            Err(DispatchError::Registry(defect)) => Err(defect.into()),
            Err(DispatchError::Entry(error)) => {
                let err = EntryError::new(location, error);
                if self.fail_fast {
                    return Err(err.into());
                }
                tracing::warn!(location = %err.location, error = %err.error, "entry not written");
                self.errors.push(err);
                Ok(None)
            }
        }
    }

    fn section(&mut self, index: usize, section: &Section) -> Result<Value, ReconcileError> {
        let mut panels = Vec::with_capacity(section.panels.len());
        for (child, panel) in section.panels.iter().enumerate() {
            if let Some(value) = self.panel(EntryLocation::child(index, child), panel)? {
                panels.push(value);
            }
        }
        Ok(ObjectBuilder::new()
            .set("title", section.title.clone())
            .set_opt("collapsed", section.collapsed)
            .set_opt("uid", section.uid.clone())
            .set("grid", ObjectBuilder::new().set("y", section.y).build())
            .set_list(PANELS_KEY, panels)
            .build())
    }
}

/// Write a desired layout in item order
///
/// # Errors
/// - [`ReconcileError::Registry`] if the registry is broken
/// - [`ReconcileError::Entry`] for the first entry error when `fail_fast` is set
pub(crate) fn write_layout(
    registry: &ConverterRegistry,
    layout: &DashboardLayout,
    fail_fast: bool,
) -> Result<WriteOutcome, ReconcileError> {
    let mut writer = Writer {
        registry,
        fail_fast,
        errors: Vec::new(),
    };
    let mut out = Vec::with_capacity(layout.items.len());

    for (index, item) in layout.items.iter().enumerate() {
        match item {
            LayoutItem::Panel(panel) => {
                if let Some(value) = writer.panel(EntryLocation::item(index), panel)? {
                    out.push(value);
                }
            }
            LayoutItem::Section(section) => out.push(writer.section(index, section)?),
        }
    }

    tracing::debug!(
        entries = out.len(),
        errors = writer.errors.len(),
        "layout written"
    );
    Ok(WriteOutcome {
        payload: Value::Array(out),
        errors: writer.errors,
    })
}
