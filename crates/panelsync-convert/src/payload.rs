use serde_json::Value;

/// External form of one panel's configuration
///
/// The panel `type` plus its `config` object, detached from grid and identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPayload {
    /// Wire panel type (`lens`, `markdown`, ...)
    pub panel_type: String,

    /// Wire config object
    pub config: Value,
}

impl PanelPayload {
    /// Create payload
    #[inline]
    #[must_use]
    pub fn new(panel_type: impl Into<String>, config: Value) -> Self {
        Self {
            panel_type: panel_type.into(),
            config,
        }
    }

    /// Lens chart type (`config.attributes.type`)
    #[inline]
    #[must_use]
    pub fn chart_type(&self) -> Option<&str> {
        self.config
            .get("attributes")
            .and_then(|attrs| attrs.get("type"))
            .and_then(Value::as_str)
    }

    /// Check the panel type
    #[inline]
    #[must_use]
    pub fn is_type(&self, panel_type: &str) -> bool {
        self.panel_type == panel_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_type_reads_attributes() {
        let payload = PanelPayload::new("lens", json!({"attributes": {"type": "pie"}}));
        assert_eq!(payload.chart_type(), Some("pie"));
        assert!(payload.is_type("lens"));

        let payload = PanelPayload::new("markdown", json!({"content": "x"}));
        assert_eq!(payload.chart_type(), None);
    }
}
