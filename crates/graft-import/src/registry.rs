//! Converter registration and resolution.
//!
//! Resolution is an ordered scan: behavior converters first, then structural
//! converters, each list in registration order. The first converter whose
//! predicate accepts the node wins.

use std::fmt;
use std::sync::Arc;

use graft_core::{ImportResult, Node, UiNode};

use crate::context::ConversionContext;
use crate::converters::{
    EllipseConverter, FrameConverter, GroupConverter, InstanceConverter, LineConverter,
    PolygonConverter, RectangleConverter, StarConverter, TextConverter, UnknownConverter,
    VectorConverter,
};

/// Which list a converter is scanned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// Matched by an explicit binding key; scanned before structural ones.
    Behavior,
    /// Matched by node kind.
    Structural,
}

/// Maps one source node to one output node.
pub trait NodeConverter: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ConverterKind {
        ConverterKind::Structural
    }

    fn can_convert(&self, node: &Node, ctx: &ConversionContext<'_>) -> bool;

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode>;
}

/// Ordered set of converters.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    behavior: Vec<Arc<dyn NodeConverter>>,
    structural: Vec<Arc<dyn NodeConverter>>,
    seeded: bool,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .field("seeded", &self.seeded)
            .finish()
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the default converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add_default_converters();
        registry.seeded = true;
        registry
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn register(&mut self, converter: impl NodeConverter + 'static) {
        self.register_arc(Arc::new(converter));
    }

    pub fn register_arc(&mut self, converter: Arc<dyn NodeConverter>) {
        tracing::trace!(
            converter = converter.name(),
            kind = ?converter.kind(),
            "registering converter"
        );
        match converter.kind() {
            ConverterKind::Behavior => self.behavior.push(converter),
            ConverterKind::Structural => self.structural.push(converter),
        }
    }

    /// Append the default structural converters, catch-all last.
    pub fn add_default_converters(&mut self) {
        self.register(GroupConverter);
        self.register(FrameConverter);
        self.register(InstanceConverter);
        self.register(RectangleConverter);
        self.register(VectorConverter);
        self.register(EllipseConverter);
        self.register(LineConverter);
        self.register(PolygonConverter);
        self.register(StarConverter);
        self.register(TextConverter);
        self.register(UnknownConverter);
    }

    /// Seed the default structural converters if none have been registered.
    /// Behavior converters do not count. Runs at most once.
    pub fn ensure_seeded(&mut self) {
        if self.seeded {
            return;
        }
        self.seeded = true;
        if self.structural.is_empty() {
            tracing::debug!(behavior = self.behavior.len(), "seeding default converters");
            self.add_default_converters();
        }
    }

    /// First converter accepting `node`, behavior converters first.
    pub fn resolve(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_>,
    ) -> Option<&Arc<dyn NodeConverter>> {
        self.behavior
            .iter()
            .find(|c| c.can_convert(node, ctx))
            .or_else(|| self.resolve_structural(node, ctx))
    }

    /// First structural converter accepting `node`.
    pub fn resolve_structural(
        &self,
        node: &Node,
        ctx: &ConversionContext<'_>,
    ) -> Option<&Arc<dyn NodeConverter>> {
        self.structural.iter().find(|c| c.can_convert(node, ctx))
    }

    /// Converter names in scan order.
    pub fn names(&self) -> Vec<&str> {
        self.behavior
            .iter()
            .chain(self.structural.iter())
            .map(|c| c.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.behavior.len() + self.structural.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Appends converters in priority order.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: ConverterRegistry,
    defaults: bool,
}

impl RegistryBuilder {
    pub fn converter(mut self, converter: impl NodeConverter + 'static) -> Self {
        self.registry.register(converter);
        self
    }

    /// Append the default converters after the ones added so far.
    pub fn defaults(mut self) -> Self {
        self.defaults = true;
        self
    }

    pub fn build(mut self) -> ConverterRegistry {
        if self.defaults {
            self.registry.add_default_converters();
        }
        self.registry.seeded = self.defaults;
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AssetTables;
    use crate::converters::BindingConverter;
    use crate::options::ImportOptions;
    use graft_core::{
        Component, Document, FrameNode, GroupNode, InstanceNode, Node, NodeKind, RectangleNode,
        TextNode, Transform, VectorNode,
    };
    use proptest::prelude::*;

    fn nodes() -> Vec<Node> {
        let t = Transform::sized(10.0, 10.0);
        vec![
            Node::frame("1", "frame", FrameNode::new(t)),
            Node::group("2", "group", GroupNode::new(t)),
            Node::instance("3", "instance", InstanceNode::new(FrameNode::new(t), "c1")),
            Node::rectangle("4", "rect", RectangleNode::new(t)),
            Node::vector("5", "vector", VectorNode::new(t)),
            Node::new("6", "ellipse", NodeKind::Ellipse(VectorNode::new(t))),
            Node::new("7", "line", NodeKind::Line(VectorNode::new(t))),
            Node::new("8", "polygon", NodeKind::Polygon(VectorNode::new(t))),
            Node::new("9", "star", NodeKind::Star(VectorNode::new(t))),
            Node::text("10", "text", TextNode::new(t, "hi")),
            Node::new(
                "11",
                "slice",
                NodeKind::Other {
                    type_tag: "SLICE".into(),
                    transform: Some(t),
                    children: Vec::new(),
                },
            ),
            Node::new(
                "12",
                "sticky",
                NodeKind::Other {
                    type_tag: "STICKY".into(),
                    transform: None,
                    children: Vec::new(),
                },
            ),
        ]
    }

    fn with_context<R>(
        document: &Document,
        registry: &ConverterRegistry,
        f: impl FnOnce(&ConversionContext<'_>) -> R,
    ) -> R {
        let options = ImportOptions::new();
        let mut tables = AssetTables::new();
        let ctx = ConversionContext::new(registry, document, &options, &mut tables);
        f(&ctx)
    }

    #[test]
    fn test_default_order() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                "group", "frame", "instance", "rectangle", "vector", "ellipse", "line", "polygon",
                "star", "text", "unknown"
            ]
        );
    }

    #[test]
    fn test_each_kind_resolves_to_its_converter() {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let expected = [
            Some("frame"),
            Some("group"),
            Some("instance"),
            Some("rectangle"),
            Some("vector"),
            Some("ellipse"),
            Some("line"),
            Some("polygon"),
            Some("star"),
            Some("text"),
            Some("unknown"),
            None,
        ];
        with_context(&document, &registry, |ctx| {
            for (node, want) in nodes().iter().zip(expected) {
                let got = registry.resolve(node, ctx).map(|c| c.name().to_string());
                assert_eq!(got.as_deref(), want, "node {}", node.name);
            }
        });
    }

    #[test]
    fn test_behavior_converters_win() {
        let document = Document::new("doc")
            .with_component(Component::new("c1", "Button").with_binding_key("ui.button"));
        let registry = ConverterRegistry::builder()
            .converter(BindingConverter::new("ui.button"))
            .defaults()
            .build();

        assert_eq!(registry.names()[0], "binding:ui.button");
        with_context(&document, &registry, |ctx| {
            let all = nodes();
            let instance = &all[2];
            let resolved = registry.resolve(instance, ctx).map(|c| c.name().to_string());
            assert_eq!(resolved.as_deref(), Some("binding:ui.button"));
            let structural = registry.resolve_structural(instance, ctx).map(|c| c.name().to_string());
            assert_eq!(structural.as_deref(), Some("instance"));
        });
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let mut registry = ConverterRegistry::new();
        assert!(registry.is_empty());
        registry.ensure_seeded();
        let count = registry.len();
        assert_eq!(count, 11);
        registry.ensure_seeded();
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn test_behavior_only_registry_gets_structural_defaults() {
        let mut registry = ConverterRegistry::builder()
            .converter(BindingConverter::new("ui.button"))
            .build();
        registry.ensure_seeded();
        let names = registry.names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "binding:ui.button");
        assert_eq!(names[1], "group");
        assert_eq!(names[11], "unknown");

        registry.ensure_seeded();
        assert_eq!(registry.len(), 12);
    }

    #[test]
    fn test_custom_structural_registry_not_seeded() {
        let mut registry = ConverterRegistry::builder().converter(TextConverter).build();
        registry.ensure_seeded();
        assert_eq!(registry.names(), vec!["text"]);
    }

    proptest! {
        #[test]
        fn test_resolution_is_deterministic(index in 0usize..12, repeats in 1usize..5) {
            let document = Document::new("doc");
            let registry = ConverterRegistry::with_defaults();
            let all = nodes();
            let node = &all[index];
            with_context(&document, &registry, |ctx| {
                let first = registry.resolve(node, ctx).map(|c| Arc::as_ptr(c) as *const ());
                for _ in 0..repeats {
                    let again = registry.resolve(node, ctx).map(|c| Arc::as_ptr(c) as *const ());
                    prop_assert_eq!(again, first);
                }
                Ok(())
            })?;
        }
    }
}
