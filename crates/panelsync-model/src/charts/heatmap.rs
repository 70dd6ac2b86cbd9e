use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Heatmap display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatmapDisplay {
    /// Axis settings
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::axis::opt"
    )]
    pub axes: Option<OpaqueValue>,

    /// Legend settings
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::legend::opt"
    )]
    pub legend: Option<OpaqueValue>,

    /// Cell labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<OpaqueValue>,
}

/// Heatmap body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct HeatmapBody<T> {
    /// Cell value
    #[serde(deserialize_with = "crate::defaults::de::operation::one")]
    pub metric: T,

    /// Horizontal buckets
    #[serde(deserialize_with = "crate::defaults::de::grouping::one")]
    pub x_axis: T,

    /// Vertical buckets
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::grouping::opt"
    )]
    pub y_axis: Option<T>,
}

/// Lens `heatmap` chart
pub type HeatmapChart = Chart<HeatmapDisplay, HeatmapBody<OpaqueValue>, HeatmapBody<EsqlColumn>>;
