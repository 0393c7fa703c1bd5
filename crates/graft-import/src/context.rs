//! Per-pass conversion state handed to converters.

use std::mem;
use std::sync::Arc;

use graft_core::{
    Behavior, Diagnostic, Document, ImportError, ImportResult, Node, TextNode, UiNode,
};
use graft_render_2d::{VectorImage, VectorSource};

use crate::cache::{AssetTables, DependencyAsset, DependencyKind, GeneratedNode};
use crate::fonts::{FontAsset, FontResolution};
use crate::options::{ErrorMode, ImportOptions};
use crate::registry::{ConverterRegistry, NodeConverter};

/// State shared by every converter during one pass.
///
/// Owns the pass log and borrows the registry, document, options and the
/// asset tables of the importer running the pass.
pub struct ConversionContext<'a> {
    registry: &'a ConverterRegistry,
    document: &'a Document,
    options: &'a ImportOptions,
    tables: &'a mut AssetTables,
    logs: Vec<Diagnostic>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        registry: &'a ConverterRegistry,
        document: &'a Document,
        options: &'a ImportOptions,
        tables: &'a mut AssetTables,
    ) -> Self {
        Self {
            registry,
            document,
            options,
            tables,
            logs: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn options(&self) -> &'a ImportOptions {
        self.options
    }

    pub fn registry(&self) -> &'a ConverterRegistry {
        self.registry
    }

    pub fn tables(&self) -> &AssetTables {
        self.tables
    }

    pub(crate) fn tables_mut(&mut self) -> &mut AssetTables {
        self.tables
    }

    /// Convert `node` with the first converter that accepts it.
    ///
    /// Returns `Ok(None)` when no converter matches, or when the converter
    /// failed and the error was logged. The node is recorded in the node
    /// table before its converter runs, so converting it twice in one pass
    /// is a structural error.
    pub fn convert_node(&mut self, node: &Node) -> ImportResult<Option<UiNode>> {
        let registry = self.registry;
        let Some(converter) = registry.resolve(node, self) else {
            tracing::trace!(node = %node.id, kind = node.type_name(), "no converter, skipping");
            return Ok(None);
        };
        self.run(node, converter.as_ref())
    }

    /// Convert `node` with structural converters only. Used by behavior
    /// converters to build the node they decorate.
    pub fn convert_structural(&mut self, node: &Node) -> ImportResult<Option<UiNode>> {
        let registry = self.registry;
        let Some(converter) = registry.resolve_structural(node, self) else {
            return Ok(None);
        };
        let ui = converter.convert(node, self)?;
        Ok(Some(ui))
    }

    fn run(
        &mut self,
        node: &Node,
        converter: &dyn NodeConverter,
    ) -> ImportResult<Option<UiNode>> {
        let mark = self.tables.mark();
        self.tables
            .nodes
            .add(node.id.as_str(), GeneratedNode::new(node, converter.name()))?;
        tracing::trace!(node = %node.id, converter = converter.name(), "converting");

        match converter.convert(node, self) {
            Ok(mut ui) => {
                ui.active = node.visible;
                self.apply_effects(node, &mut ui)?;
                Ok(Some(ui))
            }
            Err(err) => {
                self.tables.restore(mark);
                self.report_error(node, err)?;
                Ok(None)
            }
        }
    }

    /// Route an error according to the error mode.
    ///
    /// Structural errors and every error in fail-fast mode are returned to
    /// the caller. Otherwise the error is logged against its node.
    pub fn report_error(&mut self, node: &Node, err: ImportError) -> ImportResult<()> {
        if err.is_structural() || self.options.error_mode == ErrorMode::FailFast {
            return Err(err);
        }
        let origin = err.node().cloned().unwrap_or_else(|| node.id.clone());
        tracing::error!(node = %origin, error = %err, "conversion error");
        self.logs.push(Diagnostic::error(err.to_string()).at(origin));
        Ok(())
    }

    /// Raise a converter error for `node`.
    pub fn error(&mut self, node: &Node, message: impl Into<String>) -> ImportResult<()> {
        self.report_error(node, ImportError::convert(&node.id, message))
    }

    pub fn warn(&mut self, node: &Node, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(node = %node.id, "{message}");
        self.logs.push(Diagnostic::warning(message).at(node.id.clone()));
    }

    pub fn info(&mut self, node: &Node, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(node = %node.id, "{message}");
        self.logs.push(Diagnostic::info(message).at(node.id.clone()));
    }

    /// Diagnostics gathered since the last call.
    pub fn take_logs(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.logs)
    }

    pub fn logs(&self) -> &[Diagnostic] {
        &self.logs
    }

    /// Rasterize `source` for `node` and store the image under the node id.
    ///
    /// An image already generated for the node in this pass is reused. On
    /// failure a warning is logged and `None` is returned.
    pub fn rasterize(&mut self, node: &Node, source: &VectorSource) -> Option<String> {
        let key = node.id.as_str();
        let options = self.options;
        let sprite = &options.sprite;
        let result = self
            .tables
            .assets
            .get_or_try_insert_with(key, || {
                graft_render_2d::rasterize(source, sprite).map(Arc::new)
            })
            .map(|image| (image.width(), image.height()));

        match result {
            Ok((width, height)) => {
                tracing::debug!(node = %node.id, width, height, "image ready");
                Some(key.to_string())
            }
            Err(cause) => {
                let err = ImportError::Raster {
                    node: node.id.clone(),
                    source: cause,
                };
                self.warn(node, format!("image omitted: {err}"));
                None
            }
        }
    }

    pub fn image(&self, key: &str) -> Option<Arc<VectorImage>> {
        self.tables.assets.get(key).cloned()
    }

    /// Look up the font for `family`, warning when it is unmapped.
    ///
    /// Resolved assets are recorded as dependencies.
    pub fn resolve_font(&mut self, node: &Node, family: &str) -> ImportResult<Option<FontAsset>> {
        if family.is_empty() {
            return Ok(None);
        }
        let options = self.options;
        let asset = match options.fonts.resolve(family, options.fallback_font.as_ref()) {
            FontResolution::Mapped(asset) => asset,
            FontResolution::Fallback(asset) => {
                self.warn(
                    node,
                    format!("font '{family}' is not mapped, using fallback '{}'", asset.name),
                );
                asset
            }
            FontResolution::Missing => {
                self.warn(node, format!("font '{family}' is not mapped"));
                return Ok(None);
            }
        };
        self.add_dependency(&asset.path, DependencyKind::Font)?;
        Ok(Some(asset.clone()))
    }

    /// Record an external asset the output refers to. Repeats are ignored.
    pub fn add_dependency(&mut self, path: &str, kind: DependencyKind) -> ImportResult<()> {
        if self.tables.dependencies.contains(path) {
            return Ok(());
        }
        self.tables.dependencies.add(
            path,
            DependencyAsset {
                path: path.to_string(),
                kind,
            },
        )
    }

    /// Localization key from the configured hook, if any.
    pub fn localization_key(
        &mut self,
        node: &Node,
        text: &TextNode,
    ) -> ImportResult<Option<String>> {
        let options = self.options;
        let Some(hook) = options.localization.as_ref() else {
            return Ok(None);
        };
        match hook.localization_key(node, text) {
            Ok(key) => Ok(key),
            Err(err) => {
                self.report_error(node, err)?;
                Ok(None)
            }
        }
    }

    /// Hand each visible effect to the first hook that accepts it.
    fn apply_effects(&mut self, node: &Node, ui: &mut UiNode) -> ImportResult<()> {
        let options = self.options;
        let hooks = &options.effects;
        if hooks.is_empty() {
            return Ok(());
        }
        for effect in node.effects.iter().filter(|e| e.visible) {
            let Some(hook) = hooks.iter().find(|h| h.can_convert(effect)) else {
                continue;
            };
            match hook.convert(node, effect) {
                Ok(behavior) => ui.add_behavior(Behavior::Effect(behavior)),
                Err(err) => self.report_error(node, err)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ImportOptions;
    use graft_core::{
        Color, CornerRadii, FrameNode, Paint, PaintStyle, RectangleNode, Severity, Transform,
    };
    use graft_render_2d::{Geometry, SpriteOptions};

    fn rect(id: &str) -> Node {
        Node::rectangle(
            id,
            "Rect",
            RectangleNode::new(Transform::sized(32.0, 16.0))
                .with_paint(PaintStyle {
                    fills: vec![Paint::solid(Color::WHITE)],
                    ..PaintStyle::default()
                })
                .with_corner_radii(CornerRadii::uniform(4.0)),
        )
    }

    fn source(node: &Node) -> VectorSource {
        VectorSource::new(
            node.name.clone(),
            glam::Vec2::new(32.0, 16.0),
            Geometry::Rect(CornerRadii::uniform(4.0)),
        )
        .with_fill(Paint::solid(Color::WHITE))
        .sliced()
    }

    #[test]
    fn test_rasterize_reuses_cached_image() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let options =
            ImportOptions::new().with_sprite(SpriteOptions::default().with_texture_size(32));
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &options, &mut tables);

        let node = rect("1:1");
        let key = ctx.rasterize(&node, &source(&node)).unwrap();
        let first = ctx.image(&key).unwrap();
        assert_eq!(ctx.rasterize(&node, &source(&node)), Some(key.clone()));
        let second = ctx.image(&key).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.tables().assets.len(), 1);
    }

    #[test]
    fn test_rasterize_failure_is_warning() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let options = ImportOptions::new();
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &options, &mut tables);

        let node = rect("1:1");
        let empty = VectorSource::new("empty", glam::Vec2::new(10.0, 10.0), Geometry::Ellipse);
        assert_eq!(ctx.rasterize(&node, &empty), None);

        let logs = ctx.take_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].severity, Severity::Warning);
        assert!(logs[0].message.starts_with("image omitted"));
        assert!(ctx.tables().assets.is_empty());
    }

    #[test]
    fn test_error_modes() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let node = rect("1:1");

        let fail_fast = ImportOptions::new();
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &fail_fast, &mut tables);
        assert!(ctx.error(&node, "bad").is_err());
        assert!(ctx.logs().is_empty());

        let collect = ImportOptions::new().collect_errors();
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &collect, &mut tables);
        assert!(ctx.error(&node, "bad").is_ok());
        assert_eq!(ctx.logs().len(), 1);
        assert!(ctx.logs()[0].is_error());
        assert_eq!(ctx.logs()[0].node.as_ref(), Some(&node.id));

        let dup = ImportError::DuplicateKey {
            table: "nodes",
            key: "1:1".into(),
        };
        assert!(ctx.report_error(&node, dup).is_err());
    }

    #[test]
    fn test_converting_twice_is_structural() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let options = ImportOptions::new().collect_errors();
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &options, &mut tables);

        let node = Node::frame("1:1", "Frame", FrameNode::new(Transform::sized(10.0, 10.0)));
        assert!(ctx.convert_node(&node).unwrap().is_some());
        let err = ctx.convert_node(&node).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_dependencies_recorded_once() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let fonts = crate::fonts::FontTable::new()
            .with_font("Inter", FontAsset::new("Inter", "fonts/Inter.ttf"));
        let options = ImportOptions::new().with_fonts(fonts);
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &options, &mut tables);

        let node = rect("1:1");
        assert!(ctx.resolve_font(&node, "Inter").unwrap().is_some());
        assert!(ctx.resolve_font(&node, "inter").unwrap().is_some());
        assert!(ctx.resolve_font(&node, "").unwrap().is_none());
        assert_eq!(ctx.tables().dependencies.len(), 1);
        assert!(ctx.logs().is_empty());
    }
}
