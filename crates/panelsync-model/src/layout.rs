//! Dashboard layout: panels, sections and their grid placement

use serde::{Deserialize, Serialize};

use crate::config::PanelConfig;

/// Ordered layout items of one dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardLayout {
    /// Items in stored order
    pub items: Vec<LayoutItem>,
}

impl DashboardLayout {
    /// Create empty layout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    #[inline]
    #[must_use]
    pub fn with_item(mut self, item: impl Into<LayoutItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Number of top-level items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if layout is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate every panel, including panels nested in sections
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.items.iter().flat_map(|item| match item {
            LayoutItem::Panel(panel) => std::slice::from_ref(panel).iter(),
            LayoutItem::Section(section) => section.panels.iter(),
        })
    }
}

/// Top-level layout item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum LayoutItem {
    /// A single panel
    Panel(Panel),

    /// A collapsible group of panels
    Section(Section),
}

impl LayoutItem {
    /// Server-assigned identity token
    #[inline]
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Panel(panel) => panel.uid.as_deref(),
            Self::Section(section) => section.uid.as_deref(),
        }
    }
}

impl From<Panel> for LayoutItem {
    fn from(panel: Panel) -> Self {
        Self::Panel(panel)
    }
}

impl From<Section> for LayoutItem {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

/// Grid placement of a panel
///
/// `w` and `h` left unset mean "use the server default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grid {
    /// Column
    pub x: i64,

    /// Row
    pub y: i64,

    /// Width in grid columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,

    /// Height in grid rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
}

impl Grid {
    /// Create grid position with default size
    #[inline]
    #[must_use]
    pub const fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            w: None,
            h: None,
        }
    }

    /// Set explicit size
    #[inline]
    #[must_use]
    pub const fn sized(mut self, w: i64, h: i64) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }
}

/// One visual element on the dashboard grid
///
/// # Invariants
/// - `config` holds exactly one payload
/// - a set `panel_type` agrees with the payload (checked on conversion)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Panel {
    /// Server-assigned identity token, absent before first creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Grid placement
    pub grid: Grid,

    /// Wire panel type (`lens`, `markdown`, ...)
    ///
    /// Derived from the payload for typed configs; required for passthrough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,

    /// Configuration payload
    pub config: PanelConfig,
}

impl Panel {
    /// Create panel without identity
    #[inline]
    #[must_use]
    pub fn new(grid: Grid, config: impl Into<PanelConfig>) -> Self {
        Self {
            uid: None,
            grid,
            panel_type: None,
            config: config.into(),
        }
    }

    /// Set identity token
    #[inline]
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set wire panel type
    #[inline]
    #[must_use]
    pub fn with_panel_type(mut self, panel_type: impl Into<String>) -> Self {
        self.panel_type = Some(panel_type.into());
        self
    }

    /// Wire panel type, falling back to the one implied by the payload
    #[must_use]
    pub fn effective_panel_type(&self) -> Option<&str> {
        self.panel_type
            .as_deref()
            .or_else(|| self.config.implied_panel_type())
    }
}

/// Collapsible group of panels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    /// Server-assigned identity token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Section title
    pub title: String,

    /// Collapsed flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,

    /// Vertical offset
    pub y: i64,

    /// Panels in stored order
    #[serde(default)]
    pub panels: Vec<Panel>,
}

impl Section {
    /// Create empty section
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, y: i64) -> Self {
        Self {
            title: title.into(),
            y,
            ..Self::default()
        }
    }

    /// Append a panel
    #[inline]
    #[must_use]
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownConfig;

    fn markdown_panel(content: &str) -> Panel {
        Panel::new(Grid::at(0, 0), MarkdownConfig::new(content))
    }

    #[test]
    fn layout_panels_flattens_sections() {
        let layout = DashboardLayout::new()
            .with_item(markdown_panel("a"))
            .with_item(
                Section::new("Ops", 10)
                    .with_panel(markdown_panel("b"))
                    .with_panel(markdown_panel("c")),
            );
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.panels().count(), 3);
    }

    #[test]
    fn effective_panel_type_from_payload() {
        let panel = markdown_panel("hello");
        assert_eq!(panel.panel_type, None);
        assert_eq!(panel.effective_panel_type(), Some("markdown"));
    }

    #[test]
    fn grid_builders() {
        let grid = Grid::at(4, 8).sized(12, 6);
        assert_eq!(grid, Grid { x: 4, y: 8, w: Some(12), h: Some(6) });
    }

    #[test]
    fn layout_item_uid() {
        let item = LayoutItem::from(markdown_panel("a").with_uid("p1"));
        assert_eq!(item.uid(), Some("p1"));
        let item = LayoutItem::from(Section::new("S", 0));
        assert_eq!(item.uid(), None);
    }
}
