use panelsync_model::{MarkdownConfig, PanelConfig, PanelSlot, MARKDOWN_PANEL_TYPE};

use crate::converter::PanelConverter;
use crate::error::ConvertError;
use crate::payload::PanelPayload;
use crate::wire::{Fields, ObjectBuilder};

/// Markdown panels
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl PanelConverter for MarkdownConverter {
    fn kind(&self) -> &'static str {
        "markdown"
    }

    fn panel_type(&self) -> &'static str {
        MARKDOWN_PANEL_TYPE
    }

    fn owns_external(&self, payload: &PanelPayload) -> bool {
        payload.is_type(MARKDOWN_PANEL_TYPE)
    }

    fn owns_internal(&self, config: &PanelConfig) -> bool {
        config.is_populated(PanelSlot::Markdown)
    }

    fn convert_in(&self, payload: &PanelPayload) -> Result<PanelConfig, ConvertError> {
        let fields = Fields::new(&payload.config, "")?;
        Ok(MarkdownConfig {
            content: fields.req_str("content")?,
            title: fields.opt_str("title")?,
            description: fields.opt_str("description")?,
            hide_title: fields.opt_bool("hide_title")?,
        }
        .into())
    }

    fn convert_out(
        &self,
        config: &PanelConfig,
        _panel_type: Option<&str>,
    ) -> Result<PanelPayload, ConvertError> {
        let markdown = config
            .markdown
            .as_ref()
            .ok_or_else(|| ConvertError::conversion("markdown", "markdown slot is empty"))?;
        let out = ObjectBuilder::new()
            .set("content", markdown.content.as_str())
            .set_opt("title", markdown.title.as_deref())
            .set_opt("description", markdown.description.as_deref())
            .set_opt("hide_title", markdown.hide_title)
            .build();
        Ok(PanelPayload::new(MARKDOWN_PANEL_TYPE, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn markdown_round_trip() {
        let config = PanelConfig::from(MarkdownConfig::new("# Runbook").with_title("Ops"));
        let payload = MarkdownConverter.convert_out(&config, None).unwrap();
        assert_eq!(
            payload.config,
            json!({"content": "# Runbook", "title": "Ops"})
        );
        assert_eq!(MarkdownConverter.convert_in(&payload).unwrap(), config);
    }

    #[test]
    fn markdown_without_content_fails() {
        let payload = PanelPayload::new("markdown", json!({"title": "Ops"}));
        let err = MarkdownConverter.convert_in(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at content: required field is missing"
        );
    }

    #[test]
    fn ownership() {
        assert!(MarkdownConverter.owns_external(&PanelPayload::new("markdown", json!({}))));
        assert!(!MarkdownConverter.owns_external(&PanelPayload::new("lens", json!({}))));
        assert!(MarkdownConverter.owns_internal(&MarkdownConfig::new("x").into()));
        assert!(!MarkdownConverter.owns_internal(&PanelConfig::default()));
    }
}
