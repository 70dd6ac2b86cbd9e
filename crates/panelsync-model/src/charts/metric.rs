use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Metric chart display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDisplay {
    /// Colors, icons and alignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<OpaqueValue>,
}

/// Metric chart body, `T` is an operation definition or a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct MetricBody<T> {
    /// Primary and secondary metrics
    #[serde(default, deserialize_with = "crate::defaults::de::operation::list")]
    pub metrics: Vec<T>,

    /// Optional breakdown
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::grouping::opt"
    )]
    pub breakdown_by: Option<T>,
}

impl<T> Default for MetricBody<T> {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            breakdown_by: None,
        }
    }
}

/// Lens `metric` chart
pub type MetricChart = Chart<MetricDisplay, MetricBody<OpaqueValue>, MetricBody<EsqlColumn>>;
