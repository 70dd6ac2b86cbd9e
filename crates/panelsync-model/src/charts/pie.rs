use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Pie chart display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PieDisplay {
    /// Legend settings
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::legend::opt"
    )]
    pub legend: Option<OpaqueValue>,

    /// How slice values are shown
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::value_display::opt"
    )]
    pub value_display: Option<OpaqueValue>,

    /// `none`, `small`, `medium` or `large`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donut_hole: Option<String>,

    /// `inside`, `outside` or `hidden`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<String>,
}

/// Pie chart body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct PieBody<T> {
    /// Slice size metrics
    #[serde(default, deserialize_with = "crate::defaults::de::operation::list")]
    pub metrics: Vec<T>,

    /// Slice groupings, outermost first
    #[serde(default, deserialize_with = "crate::defaults::de::grouping::list")]
    pub group_by: Vec<T>,
}

impl<T> Default for PieBody<T> {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            group_by: Vec::new(),
        }
    }
}

/// Lens `pie` chart
pub type PieChart = Chart<PieDisplay, PieBody<OpaqueValue>, PieBody<EsqlColumn>>;
