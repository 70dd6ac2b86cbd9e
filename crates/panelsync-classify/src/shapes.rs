//! Built-in shape sets
//!
//! Every ambiguous union in the stored dashboard JSON has a classifier here:
//!
//! | classifier | decides between |
//! |------------|-----------------|
//! | [`LAYOUT_ITEM`] | section or panel at the top level |
//! | [`SECTION_ITEM`] | panel (the only shape allowed inside a section) |
//! | [`CHART_SOURCE`] | query-based or ES\|QL chart attributes |
//! | [`XY_LAYER`] | data layer or reference-line layer |
//! | [`LAYER_SOURCE`] | query-based or ES\|QL data layer |
//! | [`OPERATION`] | field metric, formula or static value |
//! | [`GROUPING`] | terms, date histogram, intervals or filters |

use serde_json::Value;

use crate::classifier::{Classifier, Probe, QueryBlock, Shape};

/// Dashboard-level item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A single panel
    Panel,

    /// A collapsible group of panels
    Section,
}

/// Dataset variant of a chart or layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Data view (or index) plus a text query
    Query,

    /// Computed ES|QL dataset, no query block
    Esql,
}

/// XY chart layer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Series layer (bar, line, area)
    Data,

    /// Reference-line layer
    ReferenceLines,
}

/// Metric operation definition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Aggregation over a field (`count`, `sum`, `percentile`, ...)
    FieldMetric,

    /// Lens formula
    Formula,

    /// Constant value
    StaticValue,
}

/// Grouping (bucket) definition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingKind {
    /// Top values of one or more fields
    Terms,

    /// Date histogram
    DateHistogram,

    /// Numeric ranges or histogram
    Intervals,

    /// Explicit filter buckets
    Filters,
}

/// Series types carried by XY data layers
pub const DATA_LAYER_TYPES: &[&str] = &[
    "area",
    "area_percentage",
    "area_stacked",
    "bar",
    "bar_horizontal",
    "bar_horizontal_percentage",
    "bar_horizontal_stacked",
    "bar_percentage",
    "bar_stacked",
    "line",
];

/// Operations that aggregate a field
pub const FIELD_OPERATIONS: &[&str] = &[
    "count",
    "unique_count",
    "sum",
    "average",
    "min",
    "max",
    "median",
    "standard_deviation",
    "last_value",
    "percentile",
    "percentile_rank",
    "differences",
    "moving_average",
    "cumulative_sum",
    "counter_rate",
];

const ESQL: &str = "esql";

static LAYOUT_ITEM_SHAPES: [Shape<ItemKind>; 2] = [
    Shape {
        kind: ItemKind::Section,
        name: "section",
        tags: &[],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/panels"), Probe::Absent("/type")],
        decode: None,
    },
    Shape {
        kind: ItemKind::Panel,
        name: "panel",
        tags: &[],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/type"), Probe::Absent("/panels")],
        decode: None,
    },
];

static SECTION_ITEM_SHAPES: [Shape<ItemKind>; 1] = [Shape {
    kind: ItemKind::Panel,
    name: "section panel",
    tags: &[],
    query: QueryBlock::Unspecified,
    probes: &[Probe::Present("/type"), Probe::Absent("/panels")],
    decode: None,
}];

static CHART_SOURCE_SHAPES: [Shape<SourceKind>; 2] = [
    Shape {
        kind: SourceKind::Query,
        name: "query-based",
        tags: &[],
        query: QueryBlock::Required,
        probes: &[
            Probe::Present("/dataset"),
            Probe::NotEquals("/dataset/type", ESQL),
        ],
        decode: None,
    },
    Shape {
        kind: SourceKind::Esql,
        name: "esql",
        tags: &[],
        query: QueryBlock::Forbidden,
        probes: &[Probe::Equals("/dataset/type", ESQL)],
        decode: None,
    },
];

static XY_LAYER_SHAPES: [Shape<LayerKind>; 2] = [
    Shape {
        kind: LayerKind::ReferenceLines,
        name: "reference lines",
        tags: &["referenceLines"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/thresholds")],
        decode: None,
    },
    Shape {
        kind: LayerKind::Data,
        name: "data",
        tags: DATA_LAYER_TYPES,
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/y"), Probe::Absent("/thresholds")],
        decode: None,
    },
];

static LAYER_SOURCE_SHAPES: [Shape<SourceKind>; 2] = [
    Shape {
        kind: SourceKind::Query,
        name: "query-based layer",
        tags: &[],
        query: QueryBlock::Unspecified,
        probes: &[
            Probe::Present("/dataset"),
            Probe::NotEquals("/dataset/type", ESQL),
        ],
        decode: None,
    },
    Shape {
        kind: SourceKind::Esql,
        name: "esql layer",
        tags: &[],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Equals("/dataset/type", ESQL)],
        decode: None,
    },
];

// Declared order matters for the decode stage: the field-metric decoder accepts
// nearly any object, so it must come last.
static OPERATION_SHAPES: [Shape<OperationKind>; 3] = [
    Shape {
        kind: OperationKind::Formula,
        name: "formula",
        tags: &["formula"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/formula")],
        decode: Some(decodes_formula),
    },
    Shape {
        kind: OperationKind::StaticValue,
        name: "static value",
        tags: &["static_value"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/value"), Probe::Absent("/field")],
        decode: Some(decodes_static_value),
    },
    Shape {
        kind: OperationKind::FieldMetric,
        name: "field metric",
        tags: FIELD_OPERATIONS,
        query: QueryBlock::Unspecified,
        probes: &[],
        decode: Some(decodes_field_metric),
    },
];

static GROUPING_SHAPES: [Shape<GroupingKind>; 4] = [
    Shape {
        kind: GroupingKind::Terms,
        name: "terms",
        tags: &["terms"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/fields")],
        decode: None,
    },
    Shape {
        kind: GroupingKind::DateHistogram,
        name: "date histogram",
        tags: &["date_histogram"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/field"), Probe::Present("/suggested_interval")],
        decode: None,
    },
    Shape {
        kind: GroupingKind::Intervals,
        name: "intervals",
        tags: &["range", "histogram"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/field"), Probe::Present("/granularity")],
        decode: None,
    },
    Shape {
        kind: GroupingKind::Filters,
        name: "filters",
        tags: &["filters"],
        query: QueryBlock::Unspecified,
        probes: &[Probe::Present("/filters")],
        decode: None,
    },
];

/// Top-level dashboard items
pub static LAYOUT_ITEM: Classifier<ItemKind> =
    Classifier::new("layout item", None, &LAYOUT_ITEM_SHAPES);

/// Items nested in a section
pub static SECTION_ITEM: Classifier<ItemKind> =
    Classifier::new("section item", None, &SECTION_ITEM_SHAPES);

/// Lens chart attributes
pub static CHART_SOURCE: Classifier<SourceKind> =
    Classifier::new("chart source", None, &CHART_SOURCE_SHAPES);

/// XY layers
pub static XY_LAYER: Classifier<LayerKind> =
    Classifier::new("xy layer", Some("type"), &XY_LAYER_SHAPES);

/// XY data layer dataset
pub static LAYER_SOURCE: Classifier<SourceKind> =
    Classifier::new("layer source", None, &LAYER_SOURCE_SHAPES);

/// Metric operation definitions
pub static OPERATION: Classifier<OperationKind> =
    Classifier::new("operation", Some("operation"), &OPERATION_SHAPES);

/// Grouping definitions
pub static GROUPING: Classifier<GroupingKind> =
    Classifier::new("grouping", Some("operation"), &GROUPING_SHAPES);

fn decodes_formula(value: &Value) -> bool {
    value.get("formula").is_some_and(Value::is_string)
}

fn decodes_static_value(value: &Value) -> bool {
    value.get("value").is_some_and(Value::is_number)
}

fn decodes_field_metric(value: &Value) -> bool {
    let optional_string = |key: &str| value.get(key).map_or(true, Value::is_string);
    optional_string("field") && optional_string("operation")
}
