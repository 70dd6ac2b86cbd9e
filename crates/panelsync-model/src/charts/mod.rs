//! Lens chart models
//!
//! Every chart kind shares [`ChartCommon`] and chooses between a query-based
//! and an ES|QL source. [`Chart`] carries the shared envelope; each kind plugs
//! in its display fields and its body for both source variants.

mod datatable;
mod gauge;
mod heatmap;
mod metric;
mod pie;
mod tagcloud;
mod xy;

pub use datatable::{DatatableBody, DatatableChart, DatatableDisplay};
pub use gauge::{GaugeBody, GaugeChart, GaugeDisplay};
pub use heatmap::{HeatmapBody, HeatmapChart, HeatmapDisplay};
pub use metric::{MetricBody, MetricChart, MetricDisplay};
pub use pie::{PieBody, PieChart, PieDisplay};
pub use tagcloud::{TagcloudBody, TagcloudChart, TagcloudDisplay};
pub use xy::{DataLayer, DataLayerBody, LayerSource, ReferenceLineLayer, XyChart, XyDisplay, XyLayer};

use panelsync_classify::shapes::SourceKind;
use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

/// Query language used when the server omits it
pub const DEFAULT_QUERY_LANGUAGE: &str = "kuery";

/// Fields shared by every lens chart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartCommon {
    /// Chart title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Chart description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sampling rate in `(0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<f64>,

    /// Ignore dashboard-level filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_global_filters: Option<bool>,

    /// Chart-local filters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<OpaqueValue>,
}

impl ChartCommon {
    /// Create with a title
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set sampling rate
    #[inline]
    #[must_use]
    pub fn with_sampling(mut self, sampling: f64) -> Self {
        self.sampling = Some(sampling);
        self
    }
}

/// Text query of a query-based chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// `kuery` or `lucene`
    pub language: String,

    /// Query text (wire key `query`)
    pub expression: String,
}

impl Query {
    /// KQL query
    #[inline]
    #[must_use]
    pub fn kuery(expression: impl Into<String>) -> Self {
        Self {
            language: DEFAULT_QUERY_LANGUAGE.to_string(),
            expression: expression.into(),
        }
    }

    /// Lucene query
    #[inline]
    #[must_use]
    pub fn lucene(expression: impl Into<String>) -> Self {
        Self {
            language: "lucene".to_string(),
            expression: expression.into(),
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::kuery("")
    }
}

/// Computed ES|QL dataset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EsqlDataset {
    /// ES|QL query text
    pub query: String,
}

impl EsqlDataset {
    /// Create from query text
    #[inline]
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Column reference used by ES|QL chart bodies
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EsqlColumn {
    /// Result column name
    pub column: String,

    /// Operation label shown by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Number format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OpaqueValue>,
}

impl EsqlColumn {
    /// Reference a column by name
    #[inline]
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..Self::default()
        }
    }

    /// Set display label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Dataset variant of a chart
///
/// `Q` is the body over a data view (operation definitions kept opaque),
/// `E` the body over an ES|QL dataset (column references).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ChartSource<Q, E> {
    /// Data view plus text query
    Query {
        /// Dataset reference (`{"type":"dataView","id":...}`)
        dataset: OpaqueValue,
        /// Text query
        query: Query,
        /// Chart body
        body: Q,
    },

    /// Computed ES|QL dataset, no query block
    Esql {
        /// ES|QL dataset
        dataset: EsqlDataset,
        /// Chart body
        body: E,
    },
}

impl<Q, E> ChartSource<Q, E> {
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

/// Generic lens chart: shared fields, display fields and a source-specific body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart<D, Q, E> {
    /// Shared fields
    pub common: ChartCommon,

    /// Display fields, identical for both sources
    pub display: D,

    /// Dataset variant and body
    pub source: ChartSource<Q, E>,
}

impl<D: Default, Q, E> Chart<D, Q, E> {
    /// Query-based chart with default display fields
    #[must_use]
    pub fn query(dataset: OpaqueValue, query: Query, body: Q) -> Self {
        Self {
            common: ChartCommon::default(),
            display: D::default(),
            source: ChartSource::Query {
                dataset,
                query,
                body,
            },
        }
    }

    /// ES|QL chart with default display fields
    #[must_use]
    pub fn esql(dataset: EsqlDataset, body: E) -> Self {
        Self {
            common: ChartCommon::default(),
            display: D::default(),
            source: ChartSource::Esql { dataset, body },
        }
    }
}

impl<D, Q, E> Chart<D, Q, E> {
    /// Replace shared fields
    #[inline]
    #[must_use]
    pub fn with_common(mut self, common: ChartCommon) -> Self {
        self.common = common;
        self
    }

    /// Replace display fields
    #[inline]
    #[must_use]
    pub fn with_display(mut self, display: D) -> Self {
        self.display = display;
        self
    }
}
