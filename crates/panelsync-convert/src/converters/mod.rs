//! Built-in converters

mod charts;
mod lens;
mod markdown;
mod passthrough;
mod xy;

pub use charts::{
    DatatableConverter, DatatableKind, GaugeConverter, GaugeKind, HeatmapConverter, HeatmapKind,
    MetricConverter, MetricKind, PieConverter, PieKind, TagcloudConverter, TagcloudKind,
};
pub use lens::{lens_payload, read_common, write_common, LensChart, LensChartKind, LensConverter};
pub use markdown::MarkdownConverter;
pub use passthrough::PassthroughConverter;
pub use xy::XyConverter;
