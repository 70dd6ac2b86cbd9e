//! Markdown panel model

use serde::{Deserialize, Serialize};

/// Markdown panel content
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Markdown source
    pub content: String,

    /// Panel title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Panel description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Hide the title bar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_title: Option<bool>,
}

impl MarkdownConfig {
    /// Create from markdown source
    #[inline]
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
