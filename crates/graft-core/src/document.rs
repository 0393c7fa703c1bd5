//! Source document model.
//!
//! A document is an ordered list of pages, each owning a tree of nodes.
//! Every node kind is a variant of [`NodeKind`] that carries only the
//! capabilities it actually has; converters query them through the
//! accessors on [`Node`] (`transform()`, `paint()`, `auto_layout()`, ...).

use glam::Vec2;
use indexmap::{IndexMap, IndexSet};

use crate::types::{CornerRadii, Effect, NodeId, Padding, PaintStyle, PathGeometry, Transform};

/// A parsed design document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub name: String,
    pub pages: Vec<Page>,
    /// Components by id
    pub components: IndexMap<String, Component>,
    /// Component sets by id
    pub component_sets: IndexMap<String, ComponentSet>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component.id.clone(), component);
        self
    }

    pub fn with_component_set(mut self, set: ComponentSet) -> Self {
        self.component_sets.insert(set.id.clone(), set);
        self
    }

    pub fn page(&self, id: &NodeId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    /// Find a node anywhere in the document.
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.pages
            .iter()
            .flat_map(|p| p.children.iter())
            .find_map(|n| n.find(id))
    }

    /// Distinct font families referenced by text nodes, in document order.
    pub fn used_fonts(&self) -> IndexSet<String> {
        let mut fonts = IndexSet::new();
        for page in &self.pages {
            for node in &page.children {
                node.visit(&mut |n| {
                    if let NodeKind::Text(text) = &n.kind {
                        if !text.style.font_family.is_empty() {
                            fonts.insert(text.style.font_family.clone());
                        }
                    }
                });
            }
        }
        fonts
    }

    /// The binding key of a node.
    ///
    /// An explicit key on the node wins. Instances otherwise inherit the key
    /// of their component, and then of the component's set.
    pub fn binding_key<'a>(&'a self, node: &'a Node) -> Option<&'a str> {
        if let Some(key) = node.binding_key.as_deref() {
            return Some(key);
        }
        let NodeKind::Instance(instance) = &node.kind else {
            return None;
        };
        let component = self.components.get(instance.component_id.as_deref()?)?;
        if let Some(key) = component.binding_key.as_deref() {
            return Some(key);
        }
        let set = self
            .component_sets
            .get(component.component_set_id.as_deref()?)?;
        set.binding_key.as_deref()
    }
}

/// A reusable component definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    pub id: String,
    pub name: String,
    pub binding_key: Option<String>,
    pub component_set_id: Option<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            binding_key: None,
            component_set_id: None,
        }
    }

    pub fn with_binding_key(mut self, key: impl Into<String>) -> Self {
        self.binding_key = Some(key.into());
        self
    }

    pub fn in_set(mut self, set_id: impl Into<String>) -> Self {
        self.component_set_id = Some(set_id.into());
        self
    }
}

/// A group of component variants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentSet {
    pub id: String,
    pub name: String,
    pub binding_key: Option<String>,
}

impl ComponentSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            binding_key: None,
        }
    }

    pub fn with_binding_key(mut self, key: impl Into<String>) -> Self {
        self.binding_key = Some(key.into());
        self
    }
}

/// A page (canvas) of the document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<Node>,
}

impl Page {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }
}

/// A node of the source tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub visible: bool,
    /// Explicit behavior binding declared on the node
    pub binding_key: Option<String>,
    pub effects: Vec<Effect>,
    pub kind: NodeKind,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Frame(FrameNode),
    Group(GroupNode),
    Instance(InstanceNode),
    Rectangle(RectangleNode),
    Vector(VectorNode),
    Ellipse(VectorNode),
    Line(VectorNode),
    Polygon(VectorNode),
    Star(VectorNode),
    Text(TextNode),
    /// A node kind this importer has no dedicated model for.
    Other {
        type_tag: String,
        transform: Option<Transform>,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            binding_key: None,
            effects: Vec::new(),
            kind,
        }
    }

    pub fn frame(id: impl Into<NodeId>, name: impl Into<String>, frame: FrameNode) -> Self {
        Self::new(id, name, NodeKind::Frame(frame))
    }

    pub fn group(id: impl Into<NodeId>, name: impl Into<String>, group: GroupNode) -> Self {
        Self::new(id, name, NodeKind::Group(group))
    }

    pub fn instance(id: impl Into<NodeId>, name: impl Into<String>, instance: InstanceNode) -> Self {
        Self::new(id, name, NodeKind::Instance(instance))
    }

    pub fn rectangle(id: impl Into<NodeId>, name: impl Into<String>, rect: RectangleNode) -> Self {
        Self::new(id, name, NodeKind::Rectangle(rect))
    }

    pub fn vector(id: impl Into<NodeId>, name: impl Into<String>, vector: VectorNode) -> Self {
        Self::new(id, name, NodeKind::Vector(vector))
    }

    pub fn text(id: impl Into<NodeId>, name: impl Into<String>, text: TextNode) -> Self {
        Self::new(id, name, NodeKind::Text(text))
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_binding_key(mut self, key: impl Into<String>) -> Self {
        self.binding_key = Some(key.into());
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Source type tag, as the design tool names it.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            NodeKind::Frame(_) => "FRAME",
            NodeKind::Group(_) => "GROUP",
            NodeKind::Instance(_) => "INSTANCE",
            NodeKind::Rectangle(_) => "RECTANGLE",
            NodeKind::Vector(_) => "VECTOR",
            NodeKind::Ellipse(_) => "ELLIPSE",
            NodeKind::Line(_) => "LINE",
            NodeKind::Polygon(_) => "REGULAR_POLYGON",
            NodeKind::Star(_) => "STAR",
            NodeKind::Text(_) => "TEXT",
            NodeKind::Other { type_tag, .. } => type_tag,
        }
    }

    /// Frames and instances can host auto-layout and become page roots.
    pub fn is_frame_like(&self) -> bool {
        self.frame_data().is_some()
    }

    /// The frame data of a frame or instance.
    pub fn frame_data(&self) -> Option<&FrameNode> {
        match &self.kind {
            NodeKind::Frame(frame) => Some(frame),
            NodeKind::Instance(instance) => Some(&instance.frame),
            _ => None,
        }
    }

    /// Geometry data of the path-based kinds.
    pub fn vector_data(&self) -> Option<&VectorNode> {
        match &self.kind {
            NodeKind::Vector(v)
            | NodeKind::Ellipse(v)
            | NodeKind::Line(v)
            | NodeKind::Polygon(v)
            | NodeKind::Star(v) => Some(v),
            _ => None,
        }
    }

    pub fn transform(&self) -> Option<&Transform> {
        match &self.kind {
            NodeKind::Frame(f) => Some(&f.transform),
            NodeKind::Instance(i) => Some(&i.frame.transform),
            NodeKind::Group(g) => Some(&g.transform),
            NodeKind::Rectangle(r) => Some(&r.transform),
            NodeKind::Text(t) => Some(&t.transform),
            NodeKind::Other { transform, .. } => transform.as_ref(),
            _ => self.vector_data().map(|v| &v.transform),
        }
    }

    pub fn paint(&self) -> Option<&PaintStyle> {
        match &self.kind {
            NodeKind::Frame(f) => Some(&f.paint),
            NodeKind::Instance(i) => Some(&i.frame.paint),
            NodeKind::Rectangle(r) => Some(&r.paint),
            NodeKind::Text(t) => Some(&t.paint),
            _ => self.vector_data().map(|v| &v.paint),
        }
    }

    /// Corner radii of rectangle-shaped nodes.
    pub fn corner_radii(&self) -> Option<CornerRadii> {
        match &self.kind {
            NodeKind::Rectangle(r) => Some(r.corner_radii),
            _ => self.frame_data().map(|f| f.corner_radii),
        }
    }

    pub fn auto_layout(&self) -> Option<&AutoLayout> {
        self.frame_data()
            .map(|f| &f.auto_layout)
            .filter(|layout| layout.mode != LayoutMode::None)
    }

    pub fn layout_child(&self) -> Option<&LayoutChild> {
        match &self.kind {
            NodeKind::Frame(f) => Some(&f.layout_child),
            NodeKind::Instance(i) => Some(&i.frame.layout_child),
            NodeKind::Group(g) => Some(&g.layout_child),
            NodeKind::Rectangle(r) => Some(&r.layout_child),
            NodeKind::Text(t) => Some(&t.layout_child),
            NodeKind::Other { .. } => None,
            _ => self.vector_data().map(|v| &v.layout_child),
        }
    }

    pub fn constraints(&self) -> Option<LayoutConstraints> {
        match &self.kind {
            NodeKind::Frame(f) => Some(f.constraints),
            NodeKind::Instance(i) => Some(i.frame.constraints),
            NodeKind::Group(g) => Some(g.constraints),
            NodeKind::Rectangle(r) => Some(r.constraints),
            NodeKind::Text(t) => Some(t.constraints),
            NodeKind::Other { .. } => None,
            _ => self.vector_data().map(|v| v.constraints),
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Frame(f) => &f.children,
            NodeKind::Instance(i) => &i.frame.children,
            NodeKind::Group(g) => &g.children,
            NodeKind::Other { children, .. } => children,
            _ => &[],
        }
    }

    /// Depth-first, pre-order visit of this node and its descendants.
    pub fn visit<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if &self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }
}

/// A frame: a container with optional paint, clipping and auto-layout.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameNode {
    pub transform: Transform,
    pub paint: PaintStyle,
    pub corner_radii: CornerRadii,
    pub clips_content: bool,
    pub auto_layout: AutoLayout,
    pub layout_child: LayoutChild,
    pub constraints: LayoutConstraints,
    pub children: Vec<Node>,
}

impl FrameNode {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_paint(mut self, paint: PaintStyle) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_corner_radii(mut self, radii: CornerRadii) -> Self {
        self.corner_radii = radii;
        self
    }

    pub fn clipping(mut self) -> Self {
        self.clips_content = true;
        self
    }

    pub fn with_auto_layout(mut self, layout: AutoLayout) -> Self {
        self.auto_layout = layout;
        self
    }

    pub fn with_layout_child(mut self, child: LayoutChild) -> Self {
        self.layout_child = child;
        self
    }

    pub fn with_constraints(mut self, constraints: LayoutConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

/// An instance of a component. Structurally a frame.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceNode {
    pub frame: FrameNode,
    pub component_id: Option<String>,
}

impl InstanceNode {
    pub fn new(frame: FrameNode, component_id: impl Into<String>) -> Self {
        Self {
            frame,
            component_id: Some(component_id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupNode {
    pub transform: Transform,
    pub layout_child: LayoutChild,
    pub constraints: LayoutConstraints,
    pub children: Vec<Node>,
}

impl GroupNode {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectangleNode {
    pub transform: Transform,
    pub paint: PaintStyle,
    pub corner_radii: CornerRadii,
    pub layout_child: LayoutChild,
    pub constraints: LayoutConstraints,
}

impl RectangleNode {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_paint(mut self, paint: PaintStyle) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_corner_radii(mut self, radii: CornerRadii) -> Self {
        self.corner_radii = radii;
        self
    }

    pub fn with_layout_child(mut self, child: LayoutChild) -> Self {
        self.layout_child = child;
        self
    }

    pub fn with_constraints(mut self, constraints: LayoutConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Path-based shape (vector, ellipse, line, polygon, star).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorNode {
    pub transform: Transform,
    pub paint: PaintStyle,
    /// Fill outlines in node-local coordinates; empty means "derive from kind"
    pub geometry: Vec<PathGeometry>,
    /// Polygon and star point count
    pub point_count: Option<u32>,
    /// Star inner radius as a ratio of the outer radius
    pub inner_radius: Option<f32>,
    pub layout_child: LayoutChild,
    pub constraints: LayoutConstraints,
}

impl VectorNode {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_paint(mut self, paint: PaintStyle) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_geometry(mut self, path: PathGeometry) -> Self {
        self.geometry.push(path);
        self
    }

    pub fn with_point_count(mut self, count: u32) -> Self {
        self.point_count = Some(count);
        self
    }

    pub fn with_inner_radius(mut self, ratio: f32) -> Self {
        self.inner_radius = Some(ratio);
        self
    }
}

/// A text run with a single style.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextNode {
    pub transform: Transform,
    pub characters: String,
    pub style: TextStyle,
    pub paint: PaintStyle,
    pub layout_child: LayoutChild,
    pub constraints: LayoutConstraints,
}

impl TextNode {
    pub fn new(transform: Transform, characters: impl Into<String>) -> Self {
        Self {
            transform,
            characters: characters.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_paint(mut self, paint: PaintStyle) -> Self {
        self.paint = paint;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub align_horizontal: TextAlignHorizontal,
    pub align_vertical: TextAlignVertical,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: String::new(),
            font_size: 14.0,
            font_weight: 400,
            align_horizontal: TextAlignHorizontal::Left,
            align_vertical: TextAlignVertical::Top,
        }
    }
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            ..Default::default()
        }
    }

    pub fn with_alignment(
        mut self,
        horizontal: TextAlignHorizontal,
        vertical: TextAlignVertical,
    ) -> Self {
        self.align_horizontal = horizontal;
        self.align_vertical = vertical;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignHorizontal {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignVertical {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Auto-layout direction of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Alignment of children along the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimaryAxisAlign {
    #[default]
    Min,
    Center,
    Max,
    SpaceBetween,
}

/// Alignment of children along the counter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CounterAxisAlign {
    #[default]
    Min,
    Center,
    Max,
    Baseline,
}

/// Whether a frame axis keeps its authored size or hugs its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizingMode {
    #[default]
    Fixed,
    Auto,
}

/// Auto-layout settings of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoLayout {
    pub mode: LayoutMode,
    pub primary_align: PrimaryAxisAlign,
    pub counter_align: CounterAxisAlign,
    pub primary_sizing: SizingMode,
    pub counter_sizing: SizingMode,
    pub padding: Padding,
    pub item_spacing: f32,
}

impl AutoLayout {
    pub fn horizontal() -> Self {
        Self {
            mode: LayoutMode::Horizontal,
            ..Default::default()
        }
    }

    pub fn vertical() -> Self {
        Self {
            mode: LayoutMode::Vertical,
            ..Default::default()
        }
    }

    pub fn with_align(mut self, primary: PrimaryAxisAlign, counter: CounterAxisAlign) -> Self {
        self.primary_align = primary;
        self.counter_align = counter;
        self
    }

    pub fn with_sizing(mut self, primary: SizingMode, counter: SizingMode) -> Self {
        self.primary_sizing = primary;
        self.counter_sizing = counter;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.item_spacing = spacing;
        self
    }

    pub fn is_active(&self) -> bool {
        self.mode != LayoutMode::None
    }
}

/// How a child aligns itself on its parent's counter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutAlign {
    #[default]
    Inherit,
    Stretch,
    Min,
    Center,
    Max,
}

/// Per-child participation in a parent's auto-layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutChild {
    pub layout_align: LayoutAlign,
    pub layout_grow: Option<f32>,
}

impl LayoutChild {
    pub fn stretch() -> Self {
        Self {
            layout_align: LayoutAlign::Stretch,
            layout_grow: None,
        }
    }

    pub fn grow(factor: f32) -> Self {
        Self {
            layout_align: LayoutAlign::Inherit,
            layout_grow: Some(factor),
        }
    }

    pub fn is_stretch(&self) -> bool {
        self.layout_align == LayoutAlign::Stretch
    }

    pub fn grows(&self) -> bool {
        self.layout_grow.is_some_and(|g| g > 0.0)
    }
}

/// Resizing behavior of a child along one axis when its parent resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    #[default]
    Min,
    Max,
    Center,
    Stretch,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConstraints {
    pub horizontal: ConstraintKind,
    pub vertical: ConstraintKind,
}

impl LayoutConstraints {
    pub fn new(horizontal: ConstraintKind, vertical: ConstraintKind) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Size of a transform as a convenience for layout code.
pub fn authored_size(node: &Node) -> Vec2 {
    node.transform().map(|t| t.size).unwrap_or(Vec2::ZERO)
}
