use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{Chart, EsqlColumn};
use crate::defaults::AttachRole;

/// Gauge display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GaugeDisplay {
    /// Bullet or arc shape settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<OpaqueValue>,
}

/// Gauge body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct GaugeBody<T> {
    /// Gauge value
    #[serde(deserialize_with = "crate::defaults::de::operation::one")]
    pub metric: T,

    /// Lower bound
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::operation::opt"
    )]
    pub min: Option<T>,

    /// Upper bound
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::operation::opt"
    )]
    pub max: Option<T>,

    /// Goal marker
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::operation::opt"
    )]
    pub goal: Option<T>,
}

impl<T> GaugeBody<T> {
    /// Gauge over a single metric, no bounds
    #[inline]
    #[must_use]
    pub fn new(metric: T) -> Self {
        Self {
            metric,
            min: None,
            max: None,
            goal: None,
        }
    }
}

/// Lens `gauge` chart
pub type GaugeChart = Chart<GaugeDisplay, GaugeBody<OpaqueValue>, GaugeBody<EsqlColumn>>;
