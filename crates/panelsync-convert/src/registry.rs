//! Converter registry
//!
//! Ordered list of converters behind one dispatch interface. The passthrough
//! converter lives in a separate fallback slot so it is always tried last,
//! whatever the registration order.

use once_cell::sync::Lazy;
use panelsync_model::{Panel, PanelConfig};

use crate::converter::PanelConverter;
use crate::converters::{
    DatatableConverter, GaugeConverter, HeatmapConverter, MarkdownConverter, MetricConverter,
    PassthroughConverter, PieConverter, TagcloudConverter, XyConverter,
};
use crate::error::{ConvertError, DispatchError, RegistryError};
use crate::payload::PanelPayload;

static STANDARD: Lazy<ConverterRegistry> = Lazy::new(ConverterRegistry::build_standard);

/// Result of a successful inbound conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    /// Internal config
    pub config: PanelConfig,

    /// Kind of the converter that produced it
    pub kind: &'static str,

    /// Wire panel type of the source payload
    pub panel_type: String,
}

/// Ordered converter list plus a fallback slot
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: Vec<Box<dyn PanelConverter>>,
    fallback: Option<Box<dyn PanelConverter>>,
}

impl ConverterRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry with every built-in converter
    ///
    /// Built once on first use and never mutated afterwards.
    #[inline]
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Fresh registry with every built-in converter
    #[must_use]
    pub fn build_standard() -> Self {
        let converters: Vec<Box<dyn PanelConverter>> = vec![
            Box::new(MarkdownConverter),
            Box::new(MetricConverter::new()),
            Box::new(XyConverter),
            Box::new(PieConverter::new()),
            Box::new(HeatmapConverter::new()),
            Box::new(GaugeConverter::new()),
            Box::new(DatatableConverter::new()),
            Box::new(TagcloudConverter::new()),
        ];
        Self {
            converters,
            fallback: Some(Box::new(PassthroughConverter)),
        }
    }

    /// Register a converter
    ///
    /// Fallback converters go to the fallback slot; the rest are tried in
    /// registration order.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateKind`] if the kind (or a second
    /// fallback) is already registered
    pub fn register<C: PanelConverter + 'static>(&mut self, converter: C) -> Result<(), RegistryError> {
        if self.kinds().contains(&converter.kind()) {
            return Err(RegistryError::DuplicateKind(converter.kind()));
        }
        if converter.is_fallback() {
            if let Some(existing) = &self.fallback {
                return Err(RegistryError::DuplicateKind(existing.kind()));
            }
            self.fallback = Some(Box::new(converter));
        } else {
            self.converters.push(Box::new(converter));
        }
        Ok(())
    }

    /// Builder-style [`ConverterRegistry::register`]
    ///
    /// # Errors
    /// See [`ConverterRegistry::register`]
    pub fn with<C: PanelConverter + 'static>(mut self, converter: C) -> Result<Self, RegistryError> {
        self.register(converter)?;
        Ok(self)
    }

    /// Registered kinds in dispatch order, fallback last
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.iter().map(|c| c.kind()).collect()
    }

    /// Converters in dispatch order, fallback last
    pub fn iter(&self) -> impl Iterator<Item = &dyn PanelConverter> {
        self.converters
            .iter()
            .chain(self.fallback.iter())
            .map(|c| &**c)
    }

    /// Converter by kind
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&dyn PanelConverter> {
        self.iter().find(|c| c.kind() == kind)
    }

    /// Number of converters, fallback included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len() + usize::from(self.fallback.is_some())
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a fallback converter is registered
    #[inline]
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    fn external_owner(
        &self,
        payload: &PanelPayload,
    ) -> Result<Option<&dyn PanelConverter>, RegistryError> {
        let owners: Vec<&dyn PanelConverter> = self
            .converters
            .iter()
            .map(|c| &**c)
            .filter(|c| c.owns_external(payload))
            .collect();
        match owners.as_slice() {
            [] => Ok(self
                .fallback
                .as_deref()
                .filter(|fallback| fallback.owns_external(payload))),
            [only] => Ok(Some(*only)),
            many => Err(RegistryError::AmbiguousOwnership {
                subject: describe_payload(payload),
                claimants: many.iter().map(|c| c.kind()).collect(),
            }),
        }
    }

    fn internal_owner(
        &self,
        config: &PanelConfig,
    ) -> Result<Option<&dyn PanelConverter>, RegistryError> {
        let owners: Vec<&dyn PanelConverter> = self
            .converters
            .iter()
            .map(|c| &**c)
            .filter(|c| c.owns_internal(config))
            .collect();
        match owners.as_slice() {
            [] => Ok(self
                .fallback
                .as_deref()
                .filter(|fallback| fallback.owns_internal(config))),
            [only] => Ok(Some(*only)),
            many => Err(RegistryError::AmbiguousOwnership {
                subject: format!("{:?}", config.populated_slots()),
                claimants: many.iter().map(|c| c.kind()).collect(),
            }),
        }
    }

    /// External to internal
    ///
    /// Returns `Ok(None)` only when no converter owns the payload, which never
    /// happens while a fallback is registered.
    ///
    /// # Errors
    /// - [`DispatchError::Registry`] if several converters claim the payload
    /// - [`DispatchError::Entry`] if the owning converter fails
    pub fn convert_in(&self, payload: &PanelPayload) -> Result<Option<Converted>, DispatchError> {
        let Some(converter) = self.external_owner(payload)? else {
            tracing::debug!(panel_type = %payload.panel_type, "no converter owns payload");
            return Ok(None);
        };
        tracing::trace!(
            kind = converter.kind(),
            panel_type = %payload.panel_type,
            "converter claimed payload"
        );
        let config = converter.convert_in(payload)?;
        Ok(Some(Converted {
            config,
            kind: converter.kind(),
            panel_type: payload.panel_type.clone(),
        }))
    }

    /// Internal to external
    ///
    /// Returns `Ok(None)` only when no converter owns the config.
    ///
    /// # Errors
    /// - [`ConvertError::Contradiction`] if several slots are populated, or
    ///   the stated panel type disagrees with the payload
    /// - [`ConvertError::Conversion`] if no slot is populated
    /// - [`DispatchError::Registry`] if several converters claim the config
    pub fn convert_out(&self, panel: &Panel) -> Result<Option<PanelPayload>, DispatchError> {
        let slots = panel.config.populated_slots();
        match slots.as_slice() {
            [] => {
                return Err(ConvertError::conversion("config", "no configuration payload is set").into())
            }
            [_] => {}
            many => {
                let names: Vec<_> = many.iter().map(|slot| slot.name()).collect();
                return Err(ConvertError::contradiction(format!(
                    "config populates mutually exclusive payloads: {}",
                    names.join(", ")
                ))
                .into());
            }
        }

        let Some(converter) = self.internal_owner(&panel.config)? else {
            tracing::debug!(slot = %slots[0], "no converter owns config");
            return Ok(None);
        };

        if !converter.is_fallback() {
            if let Some(stated) = panel.panel_type.as_deref() {
                if stated != converter.panel_type() {
                    return Err(ConvertError::contradiction(format!(
                        "panel type '{stated}' disagrees with {} payload of type '{}'",
                        converter.kind(),
                        converter.panel_type()
                    ))
                    .into());
                }
            }
        }

        let payload = converter.convert_out(&panel.config, panel.panel_type.as_deref())?;
        Ok(Some(payload))
    }
}

fn describe_payload(payload: &PanelPayload) -> String {
    match payload.chart_type() {
        Some(chart) => format!("{} payload ({chart})", payload.panel_type),
        None => format!("{} payload", payload.panel_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsync_model::{Grid, MarkdownConfig, OpaqueRole};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug)]
    struct GreedyMarkdown;

    impl PanelConverter for GreedyMarkdown {
        fn kind(&self) -> &'static str {
            "greedy"
        }

        fn panel_type(&self) -> &'static str {
            "markdown"
        }

        fn owns_external(&self, payload: &PanelPayload) -> bool {
            payload.is_type("markdown")
        }

        fn owns_internal(&self, config: &PanelConfig) -> bool {
            config.markdown.is_some()
        }

        fn convert_in(&self, _payload: &PanelPayload) -> Result<PanelConfig, ConvertError> {
            Ok(PanelConfig::default())
        }

        fn convert_out(
            &self,
            _config: &PanelConfig,
            _panel_type: Option<&str>,
        ) -> Result<PanelPayload, ConvertError> {
            Ok(PanelPayload::new("markdown", json!({})))
        }
    }

    fn markdown_panel() -> Panel {
        Panel::new(Grid::at(0, 0), MarkdownConfig::new("# hi"))
    }

    #[test]
    fn standard_order() {
        assert_eq!(
            ConverterRegistry::standard().kinds(),
            vec![
                "markdown", "metric", "xy", "pie", "heatmap", "gauge", "datatable", "tagcloud",
                "opaque"
            ]
        );
        assert!(ConverterRegistry::standard().has_fallback());
    }

    #[test]
    fn standard_is_shared() {
        assert!(std::ptr::eq(
            ConverterRegistry::standard(),
            ConverterRegistry::standard()
        ));
    }

    #[test]
    fn duplicate_kind_rejected() {
        let mut registry = ConverterRegistry::new();
        registry.register(MarkdownConverter).unwrap();
        assert_eq!(
            registry.register(MarkdownConverter),
            Err(RegistryError::DuplicateKind("markdown"))
        );
    }

    #[test]
    fn fallback_registered_first_is_still_tried_last() {
        let registry = ConverterRegistry::new()
            .with(PassthroughConverter)
            .and_then(|r| r.with(MarkdownConverter))
            .unwrap();
        assert_eq!(registry.kinds(), vec!["markdown", "opaque"]);
        let converted = registry
            .convert_in(&PanelPayload::new("markdown", json!({"content": "x"})))
            .unwrap()
            .unwrap();
        assert_eq!(converted.kind, "markdown");
    }

    #[test]
    fn unknown_type_goes_to_passthrough() {
        let payload = PanelPayload::new("image", json!({"src": "a.png"}));
        let converted = ConverterRegistry::standard()
            .convert_in(&payload)
            .unwrap()
            .unwrap();
        assert_eq!(converted.kind, "opaque");
        assert_eq!(converted.panel_type, "image");
        assert!(converted.config.config_json.is_some());
    }

    #[test]
    fn lens_chart_without_model_goes_to_passthrough() {
        let payload = PanelPayload::new("lens", json!({"attributes": {"type": "region_map"}}));
        let converted = ConverterRegistry::standard()
            .convert_in(&payload)
            .unwrap()
            .unwrap();
        assert_eq!(converted.kind, "opaque");
    }

    #[test]
    fn empty_registry_returns_not_owned() {
        let payload = PanelPayload::new("markdown", json!({"content": "x"}));
        assert!(ConverterRegistry::new().convert_in(&payload).unwrap().is_none());
    }

    #[test]
    fn ambiguous_ownership_is_registry_defect() {
        let registry = ConverterRegistry::new()
            .with(MarkdownConverter)
            .and_then(|r| r.with(GreedyMarkdown))
            .unwrap();
        let err = registry
            .convert_in(&PanelPayload::new("markdown", json!({"content": "x"})))
            .unwrap_err();
        assert!(err.is_registry_defect());
        let err = registry.convert_out(&markdown_panel()).unwrap_err();
        assert!(err.is_registry_defect());
    }

    #[test]
    fn convert_out_contradictions() {
        let registry = ConverterRegistry::standard();

        let mut both = markdown_panel();
        both.config.config_json = Some(OpaqueRole::Plain.attach(json!({"content": "# hi"})));
        let err = registry.convert_out(&both).unwrap_err();
        assert!(matches!(err, DispatchError::Entry(ref e) if e.is_contradiction()), "{err}");

        let mistyped = markdown_panel().with_panel_type("lens");
        let err = registry.convert_out(&mistyped).unwrap_err();
        assert!(matches!(err, DispatchError::Entry(ref e) if e.is_contradiction()), "{err}");
    }

    #[test]
    fn convert_out_empty_config_is_conversion_error() {
        let panel = Panel {
            config: PanelConfig::default(),
            ..markdown_panel()
        };
        let err = registry_err(&panel);
        assert!(matches!(err, DispatchError::Entry(ConvertError::Conversion { .. })));
    }

    fn registry_err(panel: &Panel) -> DispatchError {
        ConverterRegistry::standard().convert_out(panel).unwrap_err()
    }

    #[test]
    fn convert_out_passthrough_uses_stated_type() {
        let panel = Panel::new(
            Grid::at(0, 0),
            PanelConfig::opaque(OpaqueRole::Plain.attach(json!({"src": "a.png"}))),
        )
        .with_panel_type("image");
        let payload = ConverterRegistry::standard()
            .convert_out(&panel)
            .unwrap()
            .unwrap();
        assert_eq!(payload, PanelPayload::new("image", json!({"src": "a.png"})));
    }
}
