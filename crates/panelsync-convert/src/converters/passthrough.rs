use panelsync_model::{OpaqueRole, PanelConfig, PanelSlot};

use crate::converter::PanelConverter;
use crate::error::ConvertError;
use crate::payload::PanelPayload;

/// Catch-all for panel kinds without a typed model
///
/// Owns every external payload and keeps its config verbatim. Always tried last.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl PanelConverter for PassthroughConverter {
    fn kind(&self) -> &'static str {
        "opaque"
    }

    fn panel_type(&self) -> &'static str {
        "*"
    }

    fn owns_external(&self, _payload: &PanelPayload) -> bool {
        true
    }

    fn owns_internal(&self, config: &PanelConfig) -> bool {
        config.is_populated(PanelSlot::ConfigJson)
    }

    fn convert_in(&self, payload: &PanelPayload) -> Result<PanelConfig, ConvertError> {
        Ok(PanelConfig::opaque(
            OpaqueRole::Plain.attach(payload.config.clone()),
        ))
    }

    fn convert_out(
        &self,
        config: &PanelConfig,
        panel_type: Option<&str>,
    ) -> Result<PanelPayload, ConvertError> {
        let raw = config
            .config_json
            .as_ref()
            .ok_or_else(|| ConvertError::conversion("config_json", "passthrough slot is empty"))?;
        let panel_type = panel_type.ok_or_else(|| {
            ConvertError::conversion("type", "passthrough config needs an explicit panel type")
        })?;
        Ok(PanelPayload::new(panel_type, raw.to_wire()))
    }

    fn is_fallback(&self) -> bool {
        true
    }
}
