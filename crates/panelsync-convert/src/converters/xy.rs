//! Lens XY converter
//!
//! XY charts carry a list of layers instead of a single body. Each layer is
//! classified twice: data vs reference lines, then (for data layers) its own
//! query-based vs ES|QL dataset.

use panelsync_classify::shapes::{LayerKind, SourceKind, LAYER_SOURCE, XY_LAYER};
use panelsync_model::charts::{
    DataLayer, DataLayerBody, EsqlColumn, LayerSource, ReferenceLineLayer, XyChart, XyDisplay,
    XyLayer,
};
use panelsync_model::{OpaqueRole, PanelConfig, PanelSlot, LENS_PANEL_TYPE};
use panelsync_value::OpaqueValue;
use serde_json::Value;

use super::lens::{lens_payload, log_unrecognized, read_common, write_common, ATTRIBUTES};
use crate::converter::PanelConverter;
use crate::error::ConvertError;
use crate::payload::PanelPayload;
use crate::wire::{
    read_esql_dataset, read_query, write_esql_dataset, write_query, ColumnDef, Fields,
    ObjectBuilder,
};

const XY: &str = "xy";
const REFERENCE_LINES: &str = "referenceLines";
const XY_KEYS: &[&str] = &["axis", "legend", "decorations", "fitting", "layers"];

/// Lens XY charts
#[derive(Debug, Clone, Copy, Default)]
pub struct XyConverter;

impl PanelConverter for XyConverter {
    fn kind(&self) -> &'static str {
        XY
    }

    fn panel_type(&self) -> &'static str {
        LENS_PANEL_TYPE
    }

    fn owns_external(&self, payload: &PanelPayload) -> bool {
        payload.is_type(LENS_PANEL_TYPE) && payload.chart_type() == Some(XY)
    }

    fn owns_internal(&self, config: &PanelConfig) -> bool {
        config.is_populated(PanelSlot::Xy)
    }

    fn convert_in(&self, payload: &PanelPayload) -> Result<PanelConfig, ConvertError> {
        let root = Fields::new(&payload.config, "")?;
        let attrs = root.req_object(ATTRIBUTES, ATTRIBUTES)?;
        log_unrecognized(XY, attrs.value(), XY_KEYS);

        let query_path = attrs.key_path("query");
        let query = match attrs.get("query") {
            Some(_) => Some(read_query(&attrs.req_object("query", &query_path)?)?),
            None => None,
        };

        let layers = attrs
            .list("layers")?
            .into_iter()
            .map(|(path, value)| read_layer(value, &path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(XyChart {
            common: read_common(&attrs)?,
            query,
            display: XyDisplay {
                axis: attrs.opt_opaque("axis", OpaqueRole::Axis)?,
                legend: attrs.opt_opaque("legend", OpaqueRole::Legend)?,
                decorations: attrs.opt_opaque("decorations", OpaqueRole::Plain)?,
                fitting: attrs.opt_opaque("fitting", OpaqueRole::Plain)?,
            },
            layers,
        }
        .into())
    }

    fn convert_out(
        &self,
        config: &PanelConfig,
        _panel_type: Option<&str>,
    ) -> Result<PanelPayload, ConvertError> {
        let chart = config
            .xy
            .as_ref()
            .ok_or_else(|| ConvertError::conversion(XY, "xy slot is empty"))?;

        let attrs = ObjectBuilder::new()
            .set("type", XY)
            .merge(write_common(&chart.common))
            .set_opt("query", chart.query.as_ref().map(write_query))
            .set_opaque("axis", chart.display.axis.as_ref())
            .set_opaque("legend", chart.display.legend.as_ref())
            .set_opaque("decorations", chart.display.decorations.as_ref())
            .set_opaque("fitting", chart.display.fitting.as_ref())
            .set_list("layers", chart.layers.iter().map(write_layer).collect());

        Ok(lens_payload(attrs))
    }
}

fn read_layer(value: &Value, path: &str) -> Result<XyLayer, ConvertError> {
    let fields = Fields::new(value, path)?;
    let chosen = XY_LAYER
        .classify(value)
        .map_err(|e| ConvertError::classification(path, e))?;

    match chosen.kind {
        LayerKind::ReferenceLines => Ok(XyLayer::ReferenceLines(ReferenceLineLayer {
            dataset: fields.opt_opaque("dataset", OpaqueRole::Plain)?,
            thresholds: fields.opaque_list("thresholds", OpaqueRole::Threshold)?,
        })),
        LayerKind::Data => {
            let series_type = fields.req_str("type")?;
            let chosen = LAYER_SOURCE
                .classify(value)
                .map_err(|e| ConvertError::classification(path, e))?;
            let source = match chosen.kind {
                SourceKind::Query => LayerSource::Query {
                    dataset: fields.req_opaque("dataset", OpaqueRole::Plain)?,
                    body: read_layer_body::<OpaqueValue>(&fields)?,
                },
                SourceKind::Esql => {
                    let dataset_path = fields.key_path("dataset");
                    LayerSource::Esql {
                        dataset: read_esql_dataset(&fields.req_object("dataset", &dataset_path)?)?,
                        body: read_layer_body::<EsqlColumn>(&fields)?,
                    }
                }
            };
            Ok(XyLayer::Data(DataLayer {
                series_type,
                source,
            }))
        }
    }
}

fn read_layer_body<T: ColumnDef>(fields: &Fields<'_>) -> Result<DataLayerBody<T>, ConvertError> {
    Ok(DataLayerBody {
        x: fields.opt_grouping("x")?,
        y: fields.metrics("y")?,
        breakdown_by: fields.opt_grouping("breakdown_by")?,
    })
}

fn write_layer(layer: &XyLayer) -> Value {
    match layer {
        XyLayer::ReferenceLines(layer) => ObjectBuilder::new()
            .set("type", REFERENCE_LINES)
            .set_opaque("dataset", layer.dataset.as_ref())
            .set_list(
                "thresholds",
                layer.thresholds.iter().map(OpaqueValue::to_wire).collect(),
            )
            .build(),
        XyLayer::Data(layer) => {
            let out = ObjectBuilder::new().set("type", layer.series_type.as_str());
            let out = match &layer.source {
                LayerSource::Query { dataset, body } => out
                    .set("dataset", dataset.to_wire())
                    .merge(write_layer_body(body)),
                LayerSource::Esql { dataset, body } => out
                    .set("dataset", write_esql_dataset(dataset))
                    .merge(write_layer_body(body)),
            };
            out.build()
        }
    }
}

fn write_layer_body<T: ColumnDef>(body: &DataLayerBody<T>) -> ObjectBuilder {
    ObjectBuilder::new()
        .set_column("x", body.x.as_ref())
        .set_columns("y", &body.y)
        .set_column("breakdown_by", body.breakdown_by.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsync_model::charts::{ChartCommon, EsqlDataset, Query};
    use panelsync_model::defaults;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn chart() -> XyChart {
        XyChart::new(ChartCommon::titled("Requests"))
            .with_layer(DataLayer {
                series_type: "bar_stacked".to_string(),
                source: LayerSource::Query {
                    dataset: defaults::plain(json!({"type": "dataView", "id": "logs-*"})),
                    body: DataLayerBody {
                        x: Some(defaults::grouping(
                            json!({"operation": "date_histogram", "field": "@timestamp"}),
                        )),
                        y: vec![defaults::operation(json!({"operation": "count"}))],
                        breakdown_by: None,
                    },
                },
            })
            .with_layer(ReferenceLineLayer {
                dataset: None,
                thresholds: vec![defaults::threshold(json!({"value": 100, "color": "red"}))],
            })
    }

    #[test]
    fn xy_round_trip() {
        let mut xy = chart();
        xy.query = Some(Query::kuery("service:web"));
        xy.display.axis = Some(defaults::axis(json!({"left": {"title": "count"}})));
        let config = PanelConfig::from(xy);

        let payload = XyConverter.convert_out(&config, None).unwrap();
        assert_eq!(payload.panel_type, "lens");
        assert_eq!(
            payload.config["attributes"]["layers"][1]["thresholds"][0]["line_style"],
            json!("solid")
        );
        assert_eq!(XyConverter.convert_in(&payload).unwrap(), config);
    }

    #[test]
    fn unrecognized_attributes_are_dropped() {
        let config = PanelConfig::from(chart());
        let mut payload = XyConverter.convert_out(&config, None).unwrap();
        payload.config["attributes"]["valueLabels"] = json!("inside");

        let attrs = &payload.config["attributes"];
        assert_eq!(
            super::super::lens::unrecognized_keys(attrs, XY_KEYS),
            vec!["valueLabels"]
        );
        assert_eq!(XyConverter.convert_in(&payload).unwrap(), config);
    }

    #[test]
    fn xy_mixes_layer_sources() {
        let payload = PanelPayload::new(
            "lens",
            json!({"attributes": {
                "type": "xy",
                "layers": [
                    {"type": "line", "dataset": {"type": "esql", "query": "FROM m"}, "y": [{"column": "v"}]},
                    {"type": "area", "dataset": {"type": "dataView", "id": "m"}, "y": [{"operation": "sum", "field": "v"}]},
                ],
            }}),
        );
        let config = XyConverter.convert_in(&payload).unwrap();
        let xy = config.xy.unwrap();
        let kinds: Vec<_> = xy
            .layers
            .iter()
            .map(|layer| match layer {
                XyLayer::Data(data) => data.source.kind(),
                XyLayer::ReferenceLines(_) => panic!("unexpected reference layer"),
            })
            .collect();
        assert_eq!(kinds, vec![SourceKind::Esql, SourceKind::Query]);
        assert_eq!(xy.query, None);
    }

    #[test]
    fn unclassifiable_layer_reports_index() {
        let payload = PanelPayload::new(
            "lens",
            json!({"attributes": {
                "type": "xy",
                "layers": [
                    {"type": "referenceLines", "thresholds": []},
                    {"type": "mystery"},
                ],
            }}),
        );
        let err = XyConverter.convert_in(&payload).unwrap_err();
        assert!(
            matches!(err, ConvertError::Classification { ref path, .. } if path == "attributes.layers[1]"),
            "{err}"
        );
    }

    #[test]
    fn bad_operation_in_layer_reports_full_path() {
        let payload = PanelPayload::new(
            "lens",
            json!({"attributes": {
                "type": "xy",
                "layers": [
                    {"type": "bar", "dataset": {"type": "esql", "query": "FROM m"}, "y": [{"column": "v"}]},
                    {"type": "bar", "dataset": {"type": "esql", "query": "FROM m"}, "y": ["v"]},
                ],
            }}),
        );
        let err = XyConverter.convert_in(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.layers[1].y[0]: expected object, found string"
        );
    }

    #[test]
    fn esql_layer_writes_dataset_type() {
        let xy = XyChart::default().with_layer(DataLayer {
            series_type: "line".to_string(),
            source: LayerSource::Esql {
                dataset: EsqlDataset::new("FROM m"),
                body: DataLayerBody {
                    x: Some(EsqlColumn::new("ts")),
                    y: vec![EsqlColumn::new("v")],
                    breakdown_by: None,
                },
            },
        });
        let payload = XyConverter.convert_out(&xy.into(), None).unwrap();
        assert_eq!(
            payload.config["attributes"]["layers"][0],
            json!({"type": "line", "dataset": {"type": "esql", "query": "FROM m"}, "x": {"column": "ts"}, "y": [{"column": "v"}]})
        );
    }
}
