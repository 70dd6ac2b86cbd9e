//! Panel configuration payload
//!
//! [`PanelConfig`] has one slot per typed kind plus an opaque passthrough
//! slot. A well-formed config populates exactly one of them; conversion
//! rejects anything else as a contradiction.

use std::fmt::{self, Display, Formatter};

use panelsync_value::OpaqueValue;
use serde::{Deserialize, Serialize};

use crate::charts::{
    DatatableChart, GaugeChart, HeatmapChart, MetricChart, PieChart, TagcloudChart, XyChart,
};
use crate::markdown::MarkdownConfig;

/// Wire panel type of every lens chart
pub const LENS_PANEL_TYPE: &str = "lens";

/// Wire panel type of markdown panels
pub const MARKDOWN_PANEL_TYPE: &str = "markdown";

/// One slot of [`PanelConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelSlot {
    /// Markdown content
    Markdown,
    /// Lens metric
    Metric,
    /// Lens XY
    Xy,
    /// Lens pie
    Pie,
    /// Lens heatmap
    Heatmap,
    /// Lens gauge
    Gauge,
    /// Lens data table
    Datatable,
    /// Lens tag cloud
    Tagcloud,
    /// Opaque passthrough
    ConfigJson,
}

impl PanelSlot {
    /// All slots in declaration order
    pub const ALL: [Self; 9] = [
        Self::Markdown,
        Self::Metric,
        Self::Xy,
        Self::Pie,
        Self::Heatmap,
        Self::Gauge,
        Self::Datatable,
        Self::Tagcloud,
        Self::ConfigJson,
    ];

    /// Field name of the slot
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Metric => "metric",
            Self::Xy => "xy",
            Self::Pie => "pie",
            Self::Heatmap => "heatmap",
            Self::Gauge => "gauge",
            Self::Datatable => "datatable",
            Self::Tagcloud => "tagcloud",
            Self::ConfigJson => "config_json",
        }
    }

    /// Wire panel type implied by the slot, `None` for passthrough
    #[must_use]
    pub const fn panel_type(self) -> Option<&'static str> {
        match self {
            Self::Markdown => Some(MARKDOWN_PANEL_TYPE),
            Self::ConfigJson => None,
            _ => Some(LENS_PANEL_TYPE),
        }
    }

    /// Lens `attributes.type` of chart slots
    #[must_use]
    pub const fn chart_type(self) -> Option<&'static str> {
        match self {
            Self::Markdown | Self::ConfigJson => None,
            _ => Some(self.name()),
        }
    }
}

impl Display for PanelSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration payload of a panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Markdown content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<MarkdownConfig>,

    /// Lens metric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricChart>,

    /// Lens XY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<XyChart>,

    /// Lens pie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pie: Option<PieChart>,

    /// Lens heatmap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<HeatmapChart>,

    /// Lens gauge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge: Option<GaugeChart>,

    /// Lens data table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatable: Option<DatatableChart>,

    /// Lens tag cloud
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagcloud: Option<TagcloudChart>,

    /// Raw config for kinds without a typed model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_json: Option<OpaqueValue>,
}

impl PanelConfig {
    /// Opaque passthrough config
    #[inline]
    #[must_use]
    pub fn opaque(value: OpaqueValue) -> Self {
        Self {
            config_json: Some(value),
            ..Self::default()
        }
    }

    /// Check if a slot is populated
    #[must_use]
    pub fn is_populated(&self, slot: PanelSlot) -> bool {
        match slot {
            PanelSlot::Markdown => self.markdown.is_some(),
            PanelSlot::Metric => self.metric.is_some(),
            PanelSlot::Xy => self.xy.is_some(),
            PanelSlot::Pie => self.pie.is_some(),
            PanelSlot::Heatmap => self.heatmap.is_some(),
            PanelSlot::Gauge => self.gauge.is_some(),
            PanelSlot::Datatable => self.datatable.is_some(),
            PanelSlot::Tagcloud => self.tagcloud.is_some(),
            PanelSlot::ConfigJson => self.config_json.is_some(),
        }
    }

    /// Populated slots in declaration order
    #[must_use]
    pub fn populated_slots(&self) -> Vec<PanelSlot> {
        PanelSlot::ALL
            .into_iter()
            .filter(|slot| self.is_populated(*slot))
            .collect()
    }

    /// The single populated slot, `None` if zero or several are set
    #[must_use]
    pub fn sole_slot(&self) -> Option<PanelSlot> {
        match self.populated_slots().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Wire panel type implied by a single typed slot
    #[must_use]
    pub fn implied_panel_type(&self) -> Option<&'static str> {
        self.sole_slot().and_then(PanelSlot::panel_type)
    }
}

impl From<MarkdownConfig> for PanelConfig {
    fn from(markdown: MarkdownConfig) -> Self {
        Self {
            markdown: Some(markdown),
            ..Self::default()
        }
    }
}

impl From<XyChart> for PanelConfig {
    fn from(xy: XyChart) -> Self {
        Self {
            xy: Some(xy),
            ..Self::default()
        }
    }
}

macro_rules! chart_into_config {
    ($($chart:ty => $slot:ident),* $(,)?) => {
        $(
            impl From<$chart> for PanelConfig {
                fn from(chart: $chart) -> Self {
                    Self {
                        $slot: Some(chart),
                        ..Self::default()
                    }
                }
            }
        )*
    };
}

chart_into_config! {
    MetricChart => metric,
    PieChart => pie,
    HeatmapChart => heatmap,
    GaugeChart => gauge,
    DatatableChart => datatable,
    TagcloudChart => tagcloud,
}
