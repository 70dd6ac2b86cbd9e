//! Testing utilities for panelsync workspace
//!
//! Stored-JSON fixtures and typed layout values shared by integration tests.

#![allow(missing_docs)]

use panelsync_model::charts::{
    Chart, ChartCommon, DataLayer, DataLayerBody, EsqlColumn, EsqlDataset, LayerSource,
    MetricBody, MetricChart, Query, ReferenceLineLayer, XyChart,
};
use panelsync_model::{defaults, Grid, MarkdownConfig, Panel};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Stored (wire) fixtures

pub fn stored_panel(panel_type: &str, y: i64, config: Value) -> Value {
    json!({
        "type": panel_type,
        "grid": {"x": 0, "y": y, "w": 24, "h": 15},
        "config": config,
    })
}

pub fn stored_markdown(content: &str, y: i64) -> Value {
    stored_panel("markdown", y, json!({"content": content}))
}

/// Panel whose config is stored as text that is not JSON
pub fn stored_broken_config(y: i64) -> Value {
    stored_panel("markdown", y, json!("{\"content\": \"unterminated"))
}

pub fn stored_section(title: &str, y: i64, panels: Vec<Value>) -> Value {
    json!({
        "title": title,
        "grid": {"y": y},
        "panels": panels,
    })
}

pub fn metric_query_attributes() -> Value {
    json!({
        "type": "metric",
        "title": "Errors",
        "dataset": {"type": "dataView", "id": "logs-*"},
        "query": {"language": "kuery", "query": "status >= 500"},
        "metrics": [{"operation": "count"}],
    })
}

pub fn metric_esql_attributes() -> Value {
    json!({
        "type": "metric",
        "title": "Errors",
        "dataset": {"type": "esql", "query": "FROM logs-* | STATS errors = COUNT(*)"},
        "metrics": [{"column": "errors"}],
    })
}

pub fn stored_lens(attributes: Value, y: i64) -> Value {
    stored_panel("lens", y, json!({"attributes": attributes}))
}

// Typed fixtures

pub fn markdown_panel(content: &str, y: i64) -> Panel {
    Panel::new(Grid::at(0, y), MarkdownConfig::new(content))
}

pub fn metric_query_chart() -> MetricChart {
    Chart::query(
        defaults::plain(json!({"type": "dataView", "id": "logs-*"})),
        Query::kuery("status >= 500"),
        MetricBody {
            metrics: vec![defaults::operation(json!({"operation": "count"}))],
            breakdown_by: None,
        },
    )
    .with_common(ChartCommon::titled("Errors"))
}

pub fn metric_esql_chart() -> MetricChart {
    Chart::esql(
        EsqlDataset::new("FROM logs-* | STATS errors = COUNT(*)"),
        MetricBody {
            metrics: vec![EsqlColumn::new("errors")],
            breakdown_by: None,
        },
    )
    .with_common(ChartCommon::titled("Errors"))
}

/// XY chart with one data layer and one reference-line layer
pub fn xy_chart_with_reference_line() -> XyChart {
    XyChart::new(ChartCommon::titled("Latency"))
        .with_layer(DataLayer {
            series_type: "line".to_string(),
            source: LayerSource::Query {
                dataset: defaults::plain(json!({"type": "dataView", "id": "traces-*"})),
                body: DataLayerBody {
                    x: Some(defaults::grouping(
                        json!({"operation": "date_histogram", "field": "@timestamp"}),
                    )),
                    y: vec![defaults::operation(
                        json!({"operation": "percentile", "field": "duration", "percentile": 99}),
                    )],
                    breakdown_by: None,
                },
            },
        })
        .with_layer(ReferenceLineLayer {
            dataset: None,
            thresholds: vec![defaults::threshold(json!({"value": 250, "color": "#E7664C"}))],
        })
}
