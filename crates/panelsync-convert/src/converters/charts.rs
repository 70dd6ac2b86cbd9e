//! Lens chart kinds with a typed model (everything except XY)

use panelsync_model::charts::{
    DatatableBody, DatatableDisplay, GaugeBody, GaugeDisplay, HeatmapBody, HeatmapDisplay,
    MetricBody, MetricDisplay, PieBody, PieDisplay, TagcloudBody, TagcloudDisplay,
};
use panelsync_model::{OpaqueRole, PanelConfig, PanelSlot};

use super::lens::{LensChart, LensChartKind, LensConverter};
use crate::error::ConvertError;
use crate::wire::{ColumnDef, Fields, ObjectBuilder};

/// Lens `metric`
#[derive(Debug, Clone, Copy)]
pub struct MetricKind;

/// Lens `pie`
#[derive(Debug, Clone, Copy)]
pub struct PieKind;

/// Lens `heatmap`
#[derive(Debug, Clone, Copy)]
pub struct HeatmapKind;

/// Lens `gauge`
#[derive(Debug, Clone, Copy)]
pub struct GaugeKind;

/// Lens `datatable`
#[derive(Debug, Clone, Copy)]
pub struct DatatableKind;

/// Lens `tagcloud`
#[derive(Debug, Clone, Copy)]
pub struct TagcloudKind;

/// Metric chart converter
pub type MetricConverter = LensConverter<MetricKind>;
/// Pie chart converter
pub type PieConverter = LensConverter<PieKind>;
/// Heatmap converter
pub type HeatmapConverter = LensConverter<HeatmapKind>;
/// Gauge converter
pub type GaugeConverter = LensConverter<GaugeKind>;
/// Data table converter
pub type DatatableConverter = LensConverter<DatatableKind>;
/// Tag cloud converter
pub type TagcloudConverter = LensConverter<TagcloudKind>;

impl LensChartKind for MetricKind {
    const KIND: &'static str = "metric";
    const SLOT: PanelSlot = PanelSlot::Metric;
    const KEYS: &'static [&'static str] = &["styling", "metrics", "breakdown_by"];
    type Display = MetricDisplay;
    type Body<T> = MetricBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<MetricDisplay, ConvertError> {
        Ok(MetricDisplay {
            styling: attrs.opt_opaque("styling", OpaqueRole::Plain)?,
        })
    }

    fn write_display(display: &MetricDisplay) -> ObjectBuilder {
        ObjectBuilder::new().set_opaque("styling", display.styling.as_ref())
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<MetricBody<T>, ConvertError> {
        Ok(MetricBody {
            metrics: attrs.metrics("metrics")?,
            breakdown_by: attrs.opt_grouping("breakdown_by")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &MetricBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_columns("metrics", &body.metrics)
            .set_column("breakdown_by", body.breakdown_by.as_ref())
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.metric.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

impl LensChartKind for PieKind {
    const KIND: &'static str = "pie";
    const SLOT: PanelSlot = PanelSlot::Pie;
    const KEYS: &'static [&'static str] = &[
        "legend",
        "value_display",
        "donut_hole",
        "label_position",
        "metrics",
        "group_by",
    ];
    type Display = PieDisplay;
    type Body<T> = PieBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<PieDisplay, ConvertError> {
        Ok(PieDisplay {
            legend: attrs.opt_opaque("legend", OpaqueRole::Legend)?,
            value_display: attrs.opt_opaque("value_display", OpaqueRole::ValueDisplay)?,
            donut_hole: attrs.opt_str("donut_hole")?,
            label_position: attrs.opt_str("label_position")?,
        })
    }

    fn write_display(display: &PieDisplay) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_opaque("legend", display.legend.as_ref())
            .set_opaque("value_display", display.value_display.as_ref())
            .set_opt("donut_hole", display.donut_hole.as_deref())
            .set_opt("label_position", display.label_position.as_deref())
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<PieBody<T>, ConvertError> {
        Ok(PieBody {
            metrics: attrs.metrics("metrics")?,
            group_by: attrs.groupings("group_by")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &PieBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_columns("metrics", &body.metrics)
            .set_columns("group_by", &body.group_by)
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.pie.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

impl LensChartKind for HeatmapKind {
    const KIND: &'static str = "heatmap";
    const SLOT: PanelSlot = PanelSlot::Heatmap;
    const KEYS: &'static [&'static str] = &["axes", "legend", "cells", "metric", "x_axis", "y_axis"];
    type Display = HeatmapDisplay;
    type Body<T> = HeatmapBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<HeatmapDisplay, ConvertError> {
        Ok(HeatmapDisplay {
            axes: attrs.opt_opaque("axes", OpaqueRole::Axis)?,
            legend: attrs.opt_opaque("legend", OpaqueRole::Legend)?,
            cells: attrs.opt_opaque("cells", OpaqueRole::Plain)?,
        })
    }

    fn write_display(display: &HeatmapDisplay) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_opaque("axes", display.axes.as_ref())
            .set_opaque("legend", display.legend.as_ref())
            .set_opaque("cells", display.cells.as_ref())
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<HeatmapBody<T>, ConvertError> {
        Ok(HeatmapBody {
            metric: attrs.metric("metric")?,
            x_axis: attrs.grouping("x_axis")?,
            y_axis: attrs.opt_grouping("y_axis")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &HeatmapBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set("metric", body.metric.write())
            .set("x_axis", body.x_axis.write())
            .set_column("y_axis", body.y_axis.as_ref())
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.heatmap.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

impl LensChartKind for GaugeKind {
    const KIND: &'static str = "gauge";
    const SLOT: PanelSlot = PanelSlot::Gauge;
    const KEYS: &'static [&'static str] = &["shape", "metric", "min", "max", "goal"];
    type Display = GaugeDisplay;
    type Body<T> = GaugeBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<GaugeDisplay, ConvertError> {
        Ok(GaugeDisplay {
            shape: attrs.opt_opaque("shape", OpaqueRole::Plain)?,
        })
    }

    fn write_display(display: &GaugeDisplay) -> ObjectBuilder {
        ObjectBuilder::new().set_opaque("shape", display.shape.as_ref())
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<GaugeBody<T>, ConvertError> {
        Ok(GaugeBody {
            metric: attrs.metric("metric")?,
            min: attrs.opt_metric("min")?,
            max: attrs.opt_metric("max")?,
            goal: attrs.opt_metric("goal")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &GaugeBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set("metric", body.metric.write())
            .set_column("min", body.min.as_ref())
            .set_column("max", body.max.as_ref())
            .set_column("goal", body.goal.as_ref())
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.gauge.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

impl LensChartKind for DatatableKind {
    const KIND: &'static str = "datatable";
    const SLOT: PanelSlot = PanelSlot::Datatable;
    const KEYS: &'static [&'static str] = &["density", "paging", "metrics", "rows", "split_metrics_by"];
    type Display = DatatableDisplay;
    type Body<T> = DatatableBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<DatatableDisplay, ConvertError> {
        Ok(DatatableDisplay {
            density: attrs.opt_opaque("density", OpaqueRole::Plain)?,
            paging: attrs.opt_i64("paging")?,
        })
    }

    fn write_display(display: &DatatableDisplay) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_opaque("density", display.density.as_ref())
            .set_opt("paging", display.paging)
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<DatatableBody<T>, ConvertError> {
        Ok(DatatableBody {
            metrics: attrs.metrics("metrics")?,
            rows: attrs.groupings("rows")?,
            split_metrics_by: attrs.groupings("split_metrics_by")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &DatatableBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_columns("metrics", &body.metrics)
            .set_columns("rows", &body.rows)
            .set_columns("split_metrics_by", &body.split_metrics_by)
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.datatable.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

impl LensChartKind for TagcloudKind {
    const KIND: &'static str = "tagcloud";
    const SLOT: PanelSlot = PanelSlot::Tagcloud;
    const KEYS: &'static [&'static str] = &["orientation", "font_size", "metric", "tag_by"];
    type Display = TagcloudDisplay;
    type Body<T> = TagcloudBody<T>;

    fn read_display(attrs: &Fields<'_>) -> Result<TagcloudDisplay, ConvertError> {
        Ok(TagcloudDisplay {
            orientation: attrs.opt_str("orientation")?,
            font_size: attrs.opt_opaque("font_size", OpaqueRole::Plain)?,
        })
    }

    fn write_display(display: &TagcloudDisplay) -> ObjectBuilder {
        ObjectBuilder::new()
            .set_opt("orientation", display.orientation.as_deref())
            .set_opaque("font_size", display.font_size.as_ref())
    }

    fn read_body<T: ColumnDef>(attrs: &Fields<'_>) -> Result<TagcloudBody<T>, ConvertError> {
        Ok(TagcloudBody {
            metric: attrs.metric("metric")?,
            tag_by: attrs.grouping("tag_by")?,
        })
    }

    fn write_body<T: ColumnDef>(body: &TagcloudBody<T>) -> ObjectBuilder {
        ObjectBuilder::new()
            .set("metric", body.metric.write())
            .set("tag_by", body.tag_by.write())
    }

    fn slot(config: &PanelConfig) -> Option<&LensChart<Self>> {
        config.tagcloud.as_ref()
    }

    fn into_config(chart: LensChart<Self>) -> PanelConfig {
        chart.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::PanelConverter;
    use crate::payload::PanelPayload;
    use panelsync_classify::shapes::SourceKind;
    use panelsync_model::charts::{Chart, EsqlColumn, EsqlDataset, PieChart, Query};
    use panelsync_model::defaults;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metric_payload(attrs: serde_json::Value) -> PanelPayload {
        PanelPayload::new("lens", json!({"attributes": attrs}))
    }

    #[test]
    fn metric_with_query_is_query_based() {
        let payload = metric_payload(json!({
            "type": "metric",
            "dataset": {"type": "dataView", "id": "logs-*"},
            "query": {"language": "kuery", "query": "status:500"},
            "metrics": [{"operation": "count"}],
        }));
        let converter = MetricConverter::new();
        assert!(converter.owns_external(&payload));
        let config = converter.convert_in(&payload).unwrap();
        let chart = config.metric.unwrap();
        assert_eq!(chart.source.kind(), SourceKind::Query);
    }

    #[test]
    fn metric_without_query_and_esql_dataset_is_esql() {
        let payload = metric_payload(json!({
            "type": "metric",
            "dataset": {"type": "esql", "query": "FROM logs | STATS c = COUNT(*)"},
            "metrics": [{"column": "c"}],
        }));
        let config = MetricConverter::new().convert_in(&payload).unwrap();
        let chart = config.metric.unwrap();
        assert_eq!(chart.source.kind(), SourceKind::Esql);
    }

    #[test]
    fn metric_esql_column_without_name_fails_with_path() {
        let payload = metric_payload(json!({
            "type": "metric",
            "dataset": {"type": "esql", "query": "FROM logs"},
            "metrics": [{"column": "c"}, {"label": "oops"}],
        }));
        let err = MetricConverter::new().convert_in(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.metrics[1].column: required field is missing"
        );
    }

    #[test]
    fn lens_without_attributes_fails() {
        let payload = PanelPayload::new("lens", json!({}));
        let err = GaugeConverter::new().convert_in(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes: required field is missing"
        );
    }

    #[test]
    fn pie_round_trip_query_based() {
        let chart: PieChart = Chart::query(
            defaults::plain(json!({"type": "dataView", "id": "logs-*"})),
            Query::kuery("host:a"),
            PieBody {
                metrics: vec![defaults::operation(json!({"operation": "count"}))],
                group_by: vec![defaults::grouping(
                    json!({"operation": "terms", "fields": ["host.name"]}),
                )],
            },
        )
        .with_display(PieDisplay {
            legend: Some(defaults::legend(json!({"visible": false}))),
            donut_hole: Some("small".to_string()),
            ..PieDisplay::default()
        });
        let config = PanelConfig::from(chart);

        let converter = PieConverter::new();
        let payload = converter.convert_out(&config, None).unwrap();
        assert_eq!(payload.chart_type(), Some("pie"));
        assert_eq!(
            payload.config["attributes"]["group_by"][0]["size"],
            json!(5)
        );
        assert_eq!(converter.convert_in(&payload).unwrap(), config);
    }

    #[test]
    fn tagcloud_round_trip_esql() {
        let chart: LensChart<TagcloudKind> = Chart::esql(
            EsqlDataset::new("FROM logs | STATS c = COUNT(*) BY host"),
            TagcloudBody {
                metric: EsqlColumn::new("c"),
                tag_by: EsqlColumn::new("host").with_label("Host"),
            },
        );
        let config = PanelConfig::from(chart);
        let converter = TagcloudConverter::new();
        let payload = converter.convert_out(&config, None).unwrap();
        assert_eq!(
            payload.config["attributes"]["dataset"],
            json!({"type": "esql", "query": "FROM logs | STATS c = COUNT(*) BY host"})
        );
        assert!(payload.config["attributes"].get("query").is_none());
        assert_eq!(converter.convert_in(&payload).unwrap(), config);
    }

    fn logs_view() -> panelsync_value::OpaqueValue {
        defaults::plain(json!({"type": "dataView", "id": "logs-*"}))
    }

    fn terms(field: &str) -> panelsync_value::OpaqueValue {
        defaults::grouping(json!({"operation": "terms", "fields": [field]}))
    }

    fn round_trip<K: LensChartKind>(chart: LensChart<K>) {
        let config = K::into_config(chart);
        let converter = LensConverter::<K>::new();
        let payload = converter.convert_out(&config, None).unwrap();
        assert_eq!(payload.chart_type(), Some(K::KIND));
        assert!(converter.owns_external(&payload));
        assert_eq!(converter.convert_in(&payload).unwrap(), config);
    }

    #[test]
    fn heatmap_round_trip_query_based() {
        let chart: LensChart<HeatmapKind> = Chart::query(
            logs_view(),
            Query::kuery("service:api"),
            HeatmapBody {
                metric: defaults::operation(json!({"operation": "count"})),
                x_axis: terms("host.name"),
                y_axis: Some(terms("service.name")),
            },
        )
        .with_display(HeatmapDisplay {
            axes: Some(defaults::axis(json!({"x": {"title": "Host"}}))),
            legend: Some(defaults::legend(json!({"position": "bottom"}))),
            cells: Some(defaults::plain(json!({"labels": true}))),
        });
        round_trip::<HeatmapKind>(chart);
    }

    #[test]
    fn heatmap_round_trip_esql() {
        let chart: LensChart<HeatmapKind> = Chart::esql(
            EsqlDataset::new("FROM logs | STATS c = COUNT(*) BY host, service"),
            HeatmapBody {
                metric: EsqlColumn::new("c"),
                x_axis: EsqlColumn::new("host"),
                y_axis: Some(EsqlColumn::new("service").with_label("Service")),
            },
        );
        round_trip::<HeatmapKind>(chart);
    }

    #[test]
    fn gauge_round_trip_query_based() {
        let mut body = GaugeBody::new(defaults::operation(
            json!({"operation": "average", "field": "system.cpu.pct"}),
        ));
        body.min = Some(defaults::operation(json!({"operation": "static_value", "value": 0})));
        body.max = Some(defaults::operation(json!({"operation": "static_value", "value": 1})));
        body.goal = Some(defaults::operation(
            json!({"operation": "formula", "formula": "0.8"}),
        ));
        let chart: LensChart<GaugeKind> = Chart::query(logs_view(), Query::lucene("*"), body)
            .with_display(GaugeDisplay {
                shape: Some(defaults::plain(json!({"type": "arc"}))),
            });

        let payload = GaugeConverter::new()
            .convert_out(&PanelConfig::from(chart.clone()), None)
            .unwrap();
        assert_eq!(
            payload.config["attributes"]["goal"]["format"],
            json!({"type": "number"})
        );
        round_trip::<GaugeKind>(chart);
    }

    #[test]
    fn gauge_round_trip_esql() {
        let chart: LensChart<GaugeKind> = Chart::esql(
            EsqlDataset::new("FROM metrics | STATS cpu = AVG(system.cpu.pct)"),
            GaugeBody::new(EsqlColumn::new("cpu").with_label("CPU")),
        );
        round_trip::<GaugeKind>(chart);
    }

    #[test]
    fn datatable_round_trip_query_based() {
        let chart: LensChart<DatatableKind> = Chart::query(
            logs_view(),
            Query::kuery(""),
            DatatableBody {
                metrics: vec![
                    defaults::operation(json!({"operation": "count"})),
                    defaults::operation(json!({"operation": "percentile", "field": "bytes"})),
                ],
                rows: vec![terms("host.name")],
                split_metrics_by: vec![terms("http.method")],
            },
        )
        .with_common(panelsync_model::charts::ChartCommon::titled("Hosts"))
        .with_display(DatatableDisplay {
            density: Some(defaults::plain(json!({"mode": "compact"}))),
            paging: Some(20),
        });
        round_trip::<DatatableKind>(chart);
    }

    #[test]
    fn datatable_round_trip_esql() {
        let chart: LensChart<DatatableKind> = Chart::esql(
            EsqlDataset::new("FROM logs | STATS c = COUNT(*) BY host"),
            DatatableBody {
                metrics: vec![EsqlColumn::new("c")],
                rows: vec![EsqlColumn::new("host")],
                split_metrics_by: Vec::new(),
            },
        );
        round_trip::<DatatableKind>(chart);
    }

    #[test]
    fn datatable_paging_must_be_integer() {
        let payload = metric_payload(json!({
            "type": "datatable",
            "dataset": {"type": "esql", "query": "FROM logs"},
            "paging": "ten",
            "metrics": [],
        }));
        let err = DatatableConverter::new().convert_in(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.paging: expected integer, found string"
        );
    }

    #[test]
    fn chart_kinds_own_only_their_type() {
        let payload = metric_payload(json!({"type": "heatmap"}));
        assert!(HeatmapConverter::new().owns_external(&payload));
        assert!(!MetricConverter::new().owns_external(&payload));
        assert!(!HeatmapConverter::new().owns_external(&PanelPayload::new("markdown", json!({}))));
    }
}
