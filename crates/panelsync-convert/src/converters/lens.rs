//! Generic lens chart converter
//!
//! Every lens chart shares the envelope `{"attributes": {"type": <chart>, ...}}`,
//! the common fields and the query-based vs ES|QL split. [`LensConverter`]
//! implements all of that once; a [`LensChartKind`] supplies the chart's own
//! display fields and body.

use std::fmt;
use std::marker::PhantomData;

use panelsync_classify::shapes::{SourceKind, CHART_SOURCE};
use panelsync_model::charts::{Chart, ChartCommon, ChartSource, EsqlColumn};
use panelsync_model::{OpaqueRole, PanelConfig, PanelSlot, LENS_PANEL_TYPE};
use panelsync_value::OpaqueValue;
use serde_json::Value;

use crate::converter::PanelConverter;
use crate::error::ConvertError;
use crate::payload::PanelPayload;
use crate::wire::{
    read_esql_dataset, read_query, write_esql_dataset, write_query, ColumnDef, Fields,
    ObjectBuilder,
};

/// Path of the chart attributes inside a lens config
pub(crate) const ATTRIBUTES: &str = "attributes";

/// Attribute keys read for every lens chart
pub(crate) const COMMON_KEYS: &[&str] = &[
    "type",
    "title",
    "description",
    "sampling",
    "ignore_global_filters",
    "filters",
    "dataset",
    "query",
];

/// Typed lens chart of kind `K`
pub type LensChart<K> = Chart<
    <K as LensChartKind>::Display,
    <K as LensChartKind>::Body<OpaqueValue>,
    <K as LensChartKind>::Body<EsqlColumn>,
>;

/// Chart-specific part of a lens chart
pub trait LensChartKind: Sized + 'static {
    /// Lens `attributes.type`
    const KIND: &'static str;

    /// Config slot holding the chart
    const SLOT: PanelSlot;

    /// Attribute keys read by the display and body, besides the common ones
    const KEYS: &'static [&'static str];

    /// Display fields
    type Display;

    /// Body over either operation definitions or ES|QL columns
    type Body<T>;

    /// Read display fields from the attributes
    ///
    /// # Errors
    /// Returns [`ConvertError`] on a malformed field
    fn read_display(attrs: &Fields<'_>) -> Result<Self::Display, ConvertError>;

    /// Write display fields
    fn write_display(display: &Self::Display) -> ObjectBuilder;

    /// Read the body from the attributes
    ///
    /// # Errors
    /// Returns [`ConvertError`] on a malformed or unclassifiable element
    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<Self::Body<T>, ConvertError>;

    /// Write the body
    fn write_body<T: ColumnDef>(body: &Self::Body<T>) -> ObjectBuilder;

    /// Borrow the chart out of its slot
    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>>;

    /// Put the chart into a config
    fn into_config(chart: LensChart<Self>) -> PanelConfig;
}

/// Read the fields every lens chart shares
///
/// # Errors
/// Returns [`ConvertError::Conversion`] on a type mismatch
pub fn read_common(attrs: &Fields<'_>) -> Result<ChartCommon, ConvertError> {
    Ok(ChartCommon {
        title: attrs.opt_str("title")?,
        description: attrs.opt_str("description")?,
        sampling: attrs.opt_f64("sampling")?,
        ignore_global_filters: attrs.opt_bool("ignore_global_filters")?,
        filters: attrs.opaque_list("filters", OpaqueRole::Plain)?,
    })
}

/// Write the fields every lens chart shares
#[must_use]
pub fn write_common(common: &ChartCommon) -> ObjectBuilder {
    ObjectBuilder::new()
        .set_opt("title", common.title.as_deref())
        .set_opt("description", common.description.as_deref())
        .set_opt("sampling", common.sampling)
        .set_opt("ignore_global_filters", common.ignore_global_filters)
        .set_nonempty(
            "filters",
            common.filters.iter().map(OpaqueValue::to_wire).collect(),
        )
}

/// Attribute keys that neither [`COMMON_KEYS`] nor `known` cover, in key order
#[must_use]
pub(crate) fn unrecognized_keys<'a>(attrs: &'a Value, known: &[&str]) -> Vec<&'a str> {
    attrs.as_object().map_or_else(Vec::new, |map| {
        map.keys()
            .map(String::as_str)
            .filter(|key| !COMMON_KEYS.contains(key) && !known.contains(key))
            .collect()
    })
}

/// Log the attribute keys a typed converter drops
pub(crate) fn log_unrecognized(kind: &str, attrs: &Value, known: &[&str]) {
    let dropped = unrecognized_keys(attrs, known);
    if !dropped.is_empty() {
        tracing::debug!(kind, ?dropped, "dropping unrecognized chart attributes");
    }
}

/// Wrap chart attributes in the lens envelope
#[must_use]
pub fn lens_payload(attrs: ObjectBuilder) -> PanelPayload {
    PanelPayload::new(
        LENS_PANEL_TYPE,
        ObjectBuilder::new().set(ATTRIBUTES, attrs.build()).build(),
    )
}

/// Owns lens payloads whose `attributes.type` is `K::KIND`
pub struct LensConverter<K> {
    _kind: PhantomData<fn() -> K>,
}

impl<K> LensConverter<K> {
    /// Create converter
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<K> Default for LensConverter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LensChartKind> fmt::Debug for LensConverter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LensConverter")
            .field("kind", &K::KIND)
            .finish()
    }
}

impl<K: LensChartKind> PanelConverter for LensConverter<K> {
    fn kind(&self) -> &'static str {
        K::KIND
    }

    fn panel_type(&self) -> &'static str {
        LENS_PANEL_TYPE
    }

    fn owns_external(&self, payload: &PanelPayload) -> bool {
        payload.is_type(LENS_PANEL_TYPE) && payload.chart_type() == Some(K::KIND)
    }

    fn owns_internal(&self, config: &PanelConfig) -> bool {
        config.is_populated(K::SLOT)
    }

    fn convert_in(&self, payload: &PanelPayload) -> Result<PanelConfig, ConvertError> {
        let root = Fields::new(&payload.config, "")?;
        let attrs = root.req_object(ATTRIBUTES, ATTRIBUTES)?;

        log_unrecognized(K::KIND, attrs.value(), K::KEYS);
        let common = read_common(&attrs)?;
        let display = K::read_display(&attrs)?;

        let chosen = CHART_SOURCE
            .classify(attrs.value())
            .map_err(|e| ConvertError::classification(ATTRIBUTES, e))?;
        let source = match chosen.kind {
            SourceKind::Query => {
                let query_path = attrs.key_path("query");
                ChartSource::Query {
                    dataset: attrs.req_opaque("dataset", OpaqueRole::Plain)?,
                    query: read_query(&attrs.req_object("query", &query_path)?)?,
                    body: K::read_body::<OpaqueValue>(&attrs)?,
                }
            }
            SourceKind::Esql => {
                let dataset_path = attrs.key_path("dataset");
                ChartSource::Esql {
                    dataset: read_esql_dataset(&attrs.req_object("dataset", &dataset_path)?)?,
                    body: K::read_body::<EsqlColumn>(&attrs)?,
                }
            }
        };

        Ok(K::into_config(Chart {
            common,
            display,
            source,
        }))
    }

    fn convert_out(
        &self,
        config: &PanelConfig,
        _panel_type: Option<&str>,
    ) -> Result<PanelPayload, ConvertError> {
        let chart = K::slot(config).ok_or_else(|| {
            ConvertError::conversion(K::SLOT.name(), format!("{} slot is empty", K::KIND))
        })?;

        let attrs = ObjectBuilder::new()
            .set("type", K::KIND)
            .merge(write_common(&chart.common))
            .merge(K::write_display(&chart.display));
        let attrs = match &chart.source {
            ChartSource::Query {
                dataset,
                query,
                body,
            } => attrs
                .set("dataset", dataset.to_wire())
                .set("query", write_query(query))
                .merge(K::write_body(body)),
            ChartSource::Esql { dataset, body } => attrs
                .set("dataset", write_esql_dataset(dataset))
                .merge(K::write_body(body)),
        };

        Ok(lens_payload(attrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrecognized_keys_skip_common_and_known_keys() {
        let attrs = json!({
            "type": "metric",
            "title": "Errors",
            "dataset": {"type": "esql", "query": "FROM logs"},
            "metrics": [],
            "palette": {"name": "status"},
            "visualization_state": {},
        });
        assert_eq!(
            unrecognized_keys(&attrs, &["metrics"]),
            vec!["palette", "visualization_state"]
        );
        assert!(unrecognized_keys(&attrs, &["metrics", "palette", "visualization_state"]).is_empty());
        assert!(unrecognized_keys(&json!([]), &[]).is_empty());
    }
}
