//! End-to-end scenarios
//!
//! Stored dashboard JSON in, typed layout out, and back.

use panelsync_classify::shapes::{SourceKind, CHART_SOURCE};
use panelsync_classify::Rule;
use panelsync_convert::wire::ESQL_DATASET_TYPE;
use panelsync_model::charts::ChartCommon;
use panelsync_model::{defaults, DashboardLayout, Grid, LayoutItem, Panel, PanelConfig};
use panelsync_reconcile::{EntryLocation, Reconciler};
use panelsync_test_utils::*;
use panelsync_value::{semantic_equals, OpaqueValue};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn only_panel(layout: &DashboardLayout) -> &Panel {
    match layout.items.as_slice() {
        [LayoutItem::Panel(panel)] => panel,
        other => panic!("expected one panel, got {other:?}"),
    }
}

#[test]
fn test_metric_with_query_is_query_based() {
    init_tracing();
    let attributes = metric_query_attributes();
    let chosen = CHART_SOURCE.classify(&attributes).unwrap();
    assert_eq!(chosen.kind, SourceKind::Query);

    let outcome = Reconciler::default()
        .read(&json!([stored_lens(attributes, 0)]))
        .unwrap();
    assert!(outcome.is_complete());
    let metric = only_panel(&outcome.layout).config.metric.as_ref().unwrap();
    assert_eq!(metric.source.kind(), SourceKind::Query);
}

#[test]
fn test_metric_without_query_is_esql() {
    init_tracing();
    let attributes = metric_esql_attributes();
    assert_eq!(attributes["dataset"]["type"], json!(ESQL_DATASET_TYPE));
    let chosen = CHART_SOURCE.classify(&attributes).unwrap();
    assert_eq!(chosen.kind, SourceKind::Esql);
    assert_eq!(chosen.rule, Rule::QueryBlock);

    let outcome = Reconciler::default()
        .read(&json!([stored_lens(attributes, 0)]))
        .unwrap();
    let metric = only_panel(&outcome.layout).config.metric.as_ref().unwrap();
    assert_eq!(metric.source.kind(), SourceKind::Esql);
    assert_eq!(metric, &metric_esql_chart());
}

fn number_format(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        map.entry("format")
            .or_insert_with(|| json!({"type": "number"}));
    }
}

#[test]
fn test_opaque_defaults_suppress_drift() {
    let desired = OpaqueValue::from_value(json!({"operation": "count"}), Some(number_format));
    let observed = OpaqueValue::new(json!({"operation": "count", "format": {"type": "number"}}));
    assert!(semantic_equals(&desired, &observed));

    // The operation role injects the same format.
    let desired = defaults::operation(json!({"operation": "count"}));
    assert!(semantic_equals(&desired, &observed));
}

#[test]
fn test_malformed_panel_does_not_abort_others() {
    init_tracing();
    let stored = json!([
        stored_markdown("# first", 0),
        stored_broken_config(15),
        stored_markdown("# third", 30),
    ]);
    let outcome = Reconciler::default().read(&stored).unwrap();

    assert_eq!(outcome.layout.len(), 2);
    let contents: Vec<_> = outcome
        .layout
        .panels()
        .map(|p| p.config.markdown.as_ref().unwrap().content.clone())
        .collect();
    assert_eq!(contents, vec!["# first", "# third"]);

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].location, EntryLocation::item(1));
    assert!(
        outcome.errors[0]
            .to_string()
            .starts_with("panel 1 could not be reconciled: malformed JSON"),
        "{}",
        outcome.errors[0]
    );
}

#[test]
fn test_xy_round_trip_with_reference_line() {
    init_tracing();
    let config = PanelConfig::from(xy_chart_with_reference_line());
    let layout = DashboardLayout::new()
        .with_item(Panel::new(Grid::at(0, 0).sized(48, 20), config.clone()));

    let reconciler = Reconciler::default();
    let written = reconciler.write(&layout).unwrap();
    assert!(written.is_complete());
    let read = reconciler.read(&written.payload).unwrap();
    assert!(read.is_complete());

    let panel = only_panel(&read.layout);
    assert_eq!(panel.config, config);
    assert_eq!(panel.grid, Grid::at(0, 0).sized(48, 20));
    assert_eq!(panel.panel_type.as_deref(), Some("lens"));
}

#[test]
fn test_omitted_sampling_matches_server_default() {
    init_tracing();
    let chart = metric_query_chart();
    assert_eq!(chart.common, ChartCommon::titled("Errors"));
    assert_eq!(chart.common.sampling, None);
    let desired = Panel::new(Grid::at(0, 0), chart);

    let mut attributes = metric_query_attributes();
    attributes["sampling"] = json!(1);
    let mut observed = stored_lens(attributes, 0);
    observed["uid"] = json!("3f9c");

    assert!(!Reconciler::default().needs_update(&desired, &observed).unwrap());

    // A genuine change still registers.
    observed["config"]["attributes"]["sampling"] = json!(0.5);
    assert!(Reconciler::default().needs_update(&desired, &observed).unwrap());
}
