//! Import configuration.

use std::fmt;
use std::sync::Arc;

use graft_core::NodeId;
use graft_layout::LayoutFeatures;
use graft_render_2d::SpriteOptions;
use serde::{Deserialize, Serialize};

use crate::fonts::{FontAsset, FontTable};
use crate::hooks::{EffectConverter, LocalizationConverter};

/// What a converter-raised error does to the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Abort and roll back on the first error.
    #[default]
    FailFast,
    /// Log the error against its node and keep going.
    Collect,
}

/// Options for one import pass.
#[derive(Clone, Default)]
pub struct ImportOptions {
    /// Pages to import; `None` imports every page
    pub pages: Option<Vec<NodeId>>,
    pub sprite: SpriteOptions,
    pub error_mode: ErrorMode,
    pub layout: LayoutFeatures,
    pub fonts: FontTable,
    pub fallback_font: Option<FontAsset>,
    pub localization: Option<Arc<dyn LocalizationConverter>>,
    pub effects: Vec<Arc<dyn EffectConverter>>,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("pages", &self.pages)
            .field("sprite", &self.sprite)
            .field("error_mode", &self.error_mode)
            .field("layout", &self.layout)
            .field("fonts", &self.fonts)
            .field("fallback_font", &self.fallback_font)
            .field("localization", &self.localization.as_ref().map(|l| l.name().to_string()))
            .field(
                "effects",
                &self.effects.iter().map(|e| e.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from deserialized settings. Hooks are left unset.
    pub fn from_settings(settings: ImportSettings) -> Self {
        Self {
            pages: settings.pages,
            sprite: settings.sprite,
            error_mode: settings.error_mode,
            layout: settings.layout,
            fonts: settings.fonts,
            fallback_font: settings.fallback_font,
            localization: None,
            effects: Vec::new(),
        }
    }

    pub fn with_pages<I, T>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.pages = Some(pages.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteOptions) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn collect_errors(self) -> Self {
        self.with_error_mode(ErrorMode::Collect)
    }

    pub fn with_layout(mut self, layout: LayoutFeatures) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_fallback_font(mut self, font: FontAsset) -> Self {
        self.fallback_font = Some(font);
        self
    }

    pub fn with_localization(mut self, hook: impl LocalizationConverter + 'static) -> Self {
        self.localization = Some(Arc::new(hook));
        self
    }

    pub fn with_effect(mut self, hook: impl EffectConverter + 'static) -> Self {
        self.effects.push(Arc::new(hook));
        self
    }

    pub fn includes_page(&self, id: &NodeId) -> bool {
        match &self.pages {
            Some(pages) => pages.contains(id),
            None => true,
        }
    }
}

/// The serializable part of [`ImportOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub pages: Option<Vec<NodeId>>,
    pub sprite: SpriteOptions,
    pub error_mode: ErrorMode,
    pub layout: LayoutFeatures,
    pub fonts: FontTable,
    pub fallback_font: Option<FontAsset>,
}

impl ImportSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_render_2d::FilterMode;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::new();
        assert_eq!(options.error_mode, ErrorMode::FailFast);
        assert_eq!(options.sprite.texture_size, 1024);
        assert_eq!(options.sprite.sample_count, 4);
        assert!(options.includes_page(&NodeId::from("0:1")));
    }

    #[test]
    fn test_page_filter() {
        let options = ImportOptions::new().with_pages(["0:1"]);
        assert!(options.includes_page(&NodeId::from("0:1")));
        assert!(!options.includes_page(&NodeId::from("0:2")));

        let none = ImportOptions::new().with_pages(Vec::<NodeId>::new());
        assert!(!none.includes_page(&NodeId::from("0:1")));
    }

    #[test]
    fn test_settings_from_json() {
        let json = r#"{
            "pages": ["0:1"],
            "error_mode": "collect",
            "sprite": { "texture_size": 512, "filter_mode": "point" },
            "layout": { "content_sizing": false },
            "fonts": { "Inter": { "name": "Inter", "path": "fonts/Inter.ttf" }, "Roboto": null }
        }"#;
        let settings = ImportSettings::from_json(json).unwrap();
        let options = ImportOptions::from_settings(settings);

        assert_eq!(options.error_mode, ErrorMode::Collect);
        assert_eq!(options.sprite.texture_size, 512);
        assert_eq!(options.sprite.sample_count, 4);
        assert_eq!(options.sprite.filter_mode, FilterMode::Point);
        assert!(options.layout.alignment);
        assert!(!options.layout.content_sizing);
        assert_eq!(options.fonts.unresolved().collect::<Vec<_>>(), vec!["Roboto"]);
        assert!(options.includes_page(&NodeId::from("0:1")));
        assert!(!options.includes_page(&NodeId::from("0:9")));
    }

    #[test]
    fn test_empty_settings_are_defaults() {
        let settings = ImportSettings::from_json("{}").unwrap();
        assert_eq!(settings, ImportSettings::default());
        let json = settings.to_json().unwrap();
        assert_eq!(ImportSettings::from_json(&json).unwrap(), settings);
    }
}
