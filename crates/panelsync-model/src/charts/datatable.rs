use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Data table display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatatableDisplay {
    /// Row height and header settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<OpaqueValue>,

    /// Rows per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<i64>,
}

/// Data table body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct DatatableBody<T> {
    /// Metric columns
    #[serde(default, deserialize_with = "crate::defaults::de::operation::list")]
    pub metrics: Vec<T>,

    /// Row groupings
    #[serde(default, deserialize_with = "crate::defaults::de::grouping::list")]
    pub rows: Vec<T>,

    /// Column groupings that split every metric
    #[serde(default, deserialize_with = "crate::defaults::de::grouping::list")]
    pub split_metrics_by: Vec<T>,
}

impl<T> Default for DatatableBody<T> {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            rows: Vec::new(),
            split_metrics_by: Vec::new(),
        }
    }
}

/// Lens `datatable` chart
pub type DatatableChart =
    Chart<DatatableDisplay, DatatableBody<OpaqueValue>, DatatableBody<EsqlColumn>>;
