//! XY chart model
//!
//! Unlike the other charts, XY picks its dataset per layer: a single chart can
//! mix query-based and ES|QL data layers with reference-line layers.

use panelsync_classify::shapes::{LayerKind, SourceKind};
use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use super::{ChartCommon, EsqlColumn, EsqlDataset, Query};
use crate::defaults::AttachRole;

/// XY display fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XyDisplay {
    /// `x`, `left` and `right` axis settings
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::axis::opt"
    )]
    pub axis: Option<OpaqueValue>,

    /// Legend settings
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::legend::opt"
    )]
    pub legend: Option<OpaqueValue>,

    /// Value labels, end zones, current-time marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorations: Option<OpaqueValue>,

    /// Missing-value fitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitting: Option<OpaqueValue>,
}

/// Lens `xy` chart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XyChart {
    /// Shared fields
    pub common: ChartCommon,

    /// Chart-level text query applied to query-based layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    /// Display fields
    pub display: XyDisplay,

    /// Layers in drawing order
    #[serde(default)]
    pub layers: Vec<XyLayer>,
}

impl XyChart {
    /// Create chart with no layers
    #[inline]
    #[must_use]
    pub fn new(common: ChartCommon) -> Self {
        Self {
            common,
            ..Self::default()
        }
    }

    /// Append a layer
    #[inline]
    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<XyLayer>) -> Self {
        self.layers.push(layer.into());
        self
    }
}

/// One XY layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum XyLayer {
    /// Bar, line or area series
    Data(DataLayer),

    /// Horizontal or vertical reference lines
    ReferenceLines(ReferenceLineLayer),
}

impl XyLayer {
    /// Which kind of layer this is
    #[inline]
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Data(_) => LayerKind::Data,
            Self::ReferenceLines(_) => LayerKind::ReferenceLines,
        }
    }
}

impl From<DataLayer> for XyLayer {
    fn from(layer: DataLayer) -> Self {
        Self::Data(layer)
    }
}

impl From<ReferenceLineLayer> for XyLayer {
    fn from(layer: ReferenceLineLayer) -> Self {
        Self::ReferenceLines(layer)
    }
}

/// Series layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLayer {
    /// Series type (`bar`, `line`, `area_stacked`, ...), wire key `type`
    pub series_type: String,

    /// Dataset and dimensions
    pub source: LayerSource,
}

/// Dataset variant of a data layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LayerSource {
    /// Data view with operation definitions
    Query {
        /// Dataset reference
        dataset: OpaqueValue,
        /// Dimensions
        body: DataLayerBody<OpaqueValue>,
    },

    /// ES|QL dataset with column references
    Esql {
        /// ES|QL dataset
        dataset: EsqlDataset,
        /// Dimensions
        body: DataLayerBody<EsqlColumn>,
    },
}

impl LayerSource {
    /// Which variant this is
    #[inline]
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Query { .. } => SourceKind::Query,
            Self::Esql { .. } => SourceKind::Esql,
        }
    }
}

/// Data layer dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + AttachRole"))]
pub struct DataLayerBody<T> {
    /// Horizontal dimension
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::grouping::opt"
    )]
    pub x: Option<T>,

    /// One entry per series
    #[serde(default, deserialize_with = "crate::defaults::de::operation::list")]
    pub y: Vec<T>,

    /// Series split
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::defaults::de::grouping::opt"
    )]
    pub breakdown_by: Option<T>,
}

impl<T> Default for DataLayerBody<T> {
    fn default() -> Self {
        Self {
            x: None,
            y: Vec::new(),
            breakdown_by: None,
        }
    }
}

/// Reference-line layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceLineLayer {
    /// Dataset reference, absent for static thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<OpaqueValue>,

    /// Threshold lines
    #[serde(default, deserialize_with = "crate::defaults::de::threshold::list")]
    pub thresholds: Vec<OpaqueValue>,
}
