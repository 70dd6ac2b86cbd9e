//! Server-default normalization of typed fields
//!
//! Typed `Option` fields the server fills on save (sampling rate, grid size,
//! ...) are resolved to their server value before two configurations are
//! compared. Opaque fields are left alone; they carry their own defaults.

use serde::{Deserialize, Serialize};

use crate::charts::{Chart, ChartCommon, ChartSource, Query, XyChart, DEFAULT_QUERY_LANGUAGE};
use crate::config::PanelConfig;
use crate::layout::{DashboardLayout, Grid, LayoutItem, Panel, Section};
use crate::markdown::MarkdownConfig;

/// Values the server injects for typed fields left unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerDefaults {
    /// Chart sampling rate
    pub sampling: f64,

    /// Chart global-filter suppression
    pub ignore_global_filters: bool,

    /// Panel width in grid columns
    pub panel_width: i64,

    /// Panel height in grid rows
    pub panel_height: i64,

    /// Markdown title hiding
    pub hide_title: bool,

    /// Section collapsed flag
    pub collapsed: bool,

    /// Language of a text query that names none
    pub query_language: String,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            sampling: 1.0,
            ignore_global_filters: false,
            panel_width: 24,
            panel_height: 15,
            hide_title: false,
            collapsed: false,
            query_language: DEFAULT_QUERY_LANGUAGE.to_string(),
        }
    }
}

/// Resolve unset typed fields to their server values
pub trait Normalize {
    /// Fill every unset field the server would fill
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults);

    /// Owned variant of [`Normalize::apply_server_defaults`]
    #[must_use]
    fn normalized(mut self, defaults: &ServerDefaults) -> Self
    where
        Self: Sized,
    {
        self.apply_server_defaults(defaults);
        self
    }
}

/// Drop identity tokens assigned by the server
pub trait ServerAssigned {
    /// Clear `uid` here and in every nested item
    fn clear_server_ids(&mut self);
}

impl Normalize for ChartCommon {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.sampling.get_or_insert(defaults.sampling);
        self.ignore_global_filters
            .get_or_insert(defaults.ignore_global_filters);
    }
}

impl Normalize for Query {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        if self.language.is_empty() {
            self.language.clone_from(&defaults.query_language);
        }
    }
}

impl<D, Q, E> Normalize for Chart<D, Q, E> {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.common.apply_server_defaults(defaults);
        if let ChartSource::Query { query, .. } = &mut self.source {
            query.apply_server_defaults(defaults);
        }
    }
}

impl Normalize for XyChart {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.common.apply_server_defaults(defaults);
        if let Some(query) = &mut self.query {
            query.apply_server_defaults(defaults);
        }
    }
}

impl Normalize for MarkdownConfig {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.hide_title.get_or_insert(defaults.hide_title);
    }
}

impl Normalize for PanelConfig {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        if let Some(markdown) = &mut self.markdown {
            markdown.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.metric {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.xy {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.pie {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.heatmap {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.gauge {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.datatable {
            chart.apply_server_defaults(defaults);
        }
        if let Some(chart) = &mut self.tagcloud {
            chart.apply_server_defaults(defaults);
        }
    }
}

impl Normalize for Grid {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.w.get_or_insert(defaults.panel_width);
        self.h.get_or_insert(defaults.panel_height);
    }
}

impl Normalize for Panel {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.grid.apply_server_defaults(defaults);
        if self.panel_type.is_none() {
            self.panel_type = self.config.implied_panel_type().map(str::to_string);
        }
        self.config.apply_server_defaults(defaults);
    }
}

impl Normalize for Section {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        self.collapsed.get_or_insert(defaults.collapsed);
        for panel in &mut self.panels {
            panel.apply_server_defaults(defaults);
        }
    }
}

impl Normalize for LayoutItem {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        match self {
            Self::Panel(panel) => panel.apply_server_defaults(defaults),
            Self::Section(section) => section.apply_server_defaults(defaults),
        }
    }
}

impl Normalize for DashboardLayout {
    fn apply_server_defaults(&mut self, defaults: &ServerDefaults) {
        for item in &mut self.items {
            item.apply_server_defaults(defaults);
        }
    }
}

impl ServerAssigned for Panel {
    fn clear_server_ids(&mut self) {
        self.uid = None;
    }
}

impl ServerAssigned for Section {
    fn clear_server_ids(&mut self) {
        self.uid = None;
        for panel in &mut self.panels {
            panel.clear_server_ids();
        }
    }
}

impl ServerAssigned for LayoutItem {
    fn clear_server_ids(&mut self) {
        match self {
            Self::Panel(panel) => panel.clear_server_ids(),
            Self::Section(section) => section.clear_server_ids(),
        }
    }
}

impl ServerAssigned for DashboardLayout {
    fn clear_server_ids(&mut self) {
        for item in &mut self.items {
            item.clear_server_ids();
        }
    }
}
