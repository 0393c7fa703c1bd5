//! The output UI tree.
//!
//! Each [`UiNode`] mirrors one source node (same id), is placed with anchors
//! and offsets relative to its parent, and carries an open set of
//! [`Behavior`]s chosen by the converter that produced it.

use glam::Vec2;
use smallvec::SmallVec;

use crate::diagnostics::Diagnostic;
use crate::types::{Color, Effect, NodeId, Padding, Transform};

/// Anchor/offset placement relative to the parent rectangle.
///
/// Coordinates use a top-left origin with y growing downwards. Anchors are
/// fractions of the parent size, offsets are in source units added to the
/// anchored points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub anchor_min: Vec2,
    pub anchor_max: Vec2,
    pub offset_min: Vec2,
    pub offset_max: Vec2,
    /// Rotation in degrees around the rectangle's center
    pub rotation: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self::stretch()
    }
}

impl Placement {
    /// Fill the parent completely.
    pub fn stretch() -> Self {
        Self {
            anchor_min: Vec2::ZERO,
            anchor_max: Vec2::ONE,
            offset_min: Vec2::ZERO,
            offset_max: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    /// A fixed rectangle anchored to the parent's top-left corner.
    pub fn fixed(transform: &Transform) -> Self {
        Self {
            anchor_min: Vec2::ZERO,
            anchor_max: Vec2::ZERO,
            offset_min: transform.position,
            offset_max: transform.position + transform.size,
            rotation: transform.rotation,
        }
    }

    /// Resolve to a (position, size) pair for a given parent size.
    pub fn resolve(&self, parent_size: Vec2) -> (Vec2, Vec2) {
        let min = self.anchor_min * parent_size + self.offset_min;
        let max = self.anchor_max * parent_size + self.offset_max;
        (min, max - min)
    }

    pub fn is_stretch(&self) -> bool {
        *self == Self::stretch()
    }
}

/// Position of something along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Start,
    Center,
    End,
}

/// The nine alignment presets of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorPreset {
    #[default]
    UpperLeft,
    UpperCenter,
    UpperRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

impl AnchorPreset {
    pub fn from_positions(horizontal: AxisPosition, vertical: AxisPosition) -> Self {
        use AxisPosition::*;
        match (vertical, horizontal) {
            (Start, Start) => AnchorPreset::UpperLeft,
            (Start, Center) => AnchorPreset::UpperCenter,
            (Start, End) => AnchorPreset::UpperRight,
            (Center, Start) => AnchorPreset::MiddleLeft,
            (Center, Center) => AnchorPreset::MiddleCenter,
            (Center, End) => AnchorPreset::MiddleRight,
            (End, Start) => AnchorPreset::LowerLeft,
            (End, Center) => AnchorPreset::LowerCenter,
            (End, End) => AnchorPreset::LowerRight,
        }
    }

    pub fn horizontal(&self) -> AxisPosition {
        match self {
            AnchorPreset::UpperLeft | AnchorPreset::MiddleLeft | AnchorPreset::LowerLeft => {
                AxisPosition::Start
            }
            AnchorPreset::UpperCenter | AnchorPreset::MiddleCenter | AnchorPreset::LowerCenter => {
                AxisPosition::Center
            }
            AnchorPreset::UpperRight | AnchorPreset::MiddleRight | AnchorPreset::LowerRight => {
                AxisPosition::End
            }
        }
    }

    pub fn vertical(&self) -> AxisPosition {
        match self {
            AnchorPreset::UpperLeft | AnchorPreset::UpperCenter | AnchorPreset::UpperRight => {
                AxisPosition::Start
            }
            AnchorPreset::MiddleLeft | AnchorPreset::MiddleCenter | AnchorPreset::MiddleRight => {
                AxisPosition::Center
            }
            AnchorPreset::LowerLeft | AnchorPreset::LowerCenter | AnchorPreset::LowerRight => {
                AxisPosition::End
            }
        }
    }
}

/// How an image is drawn into its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageType {
    #[default]
    Simple,
    /// 9-slice: borders keep their size, the center stretches
    Sliced,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageBehavior {
    /// Key of the generated image in the asset table
    pub asset_key: String,
    pub image_type: ImageType,
    pub tint: Color,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// A linear layout container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutGroup {
    pub direction: LayoutDirection,
    pub child_alignment: AnchorPreset,
    pub padding: Padding,
    pub spacing: f32,
    pub control_child_width: bool,
    pub control_child_height: bool,
    pub force_expand_width: bool,
    pub force_expand_height: bool,
}

impl LayoutGroup {
    pub fn new(direction: LayoutDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }
}

/// Size hints of a child inside a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutElement {
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub flexible_width: Option<f32>,
    pub flexible_height: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitMode {
    #[default]
    Unconstrained,
    PreferredSize,
}

/// Resize the node to its content, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentSizeFitter {
    pub horizontal_fit: FitMode,
    pub vertical_fit: FitMode,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextBehavior {
    pub content: String,
    /// Name of the resolved font asset, if any
    pub font: Option<String>,
    pub font_size: f32,
    pub color: Color,
    pub alignment: AnchorPreset,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectBehavior {
    /// Name of the converter that produced this behavior
    pub converter: String,
    pub effect: Effect,
}

/// Something attached to an output node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    Image(ImageBehavior),
    LayoutGroup(LayoutGroup),
    LayoutElement(LayoutElement),
    ContentSizeFitter(ContentSizeFitter),
    Mask,
    Text(TextBehavior),
    Binding { key: String },
    Localized { key: String },
    Effect(EffectBehavior),
}

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UiNode {
    pub id: NodeId,
    pub name: String,
    pub active: bool,
    pub placement: Placement,
    pub behaviors: SmallVec<[Behavior; 4]>,
    pub children: Vec<UiNode>,
    pub logs: Vec<Diagnostic>,
}

impl UiNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            placement: Placement::stretch(),
            behaviors: SmallVec::new(),
            children: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn add_behavior(&mut self, behavior: Behavior) {
        self.behaviors.push(behavior);
    }

    pub fn add_child(&mut self, child: UiNode) {
        self.children.push(child);
    }

    pub fn image(&self) -> Option<&ImageBehavior> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::Image(image) => Some(image),
            _ => None,
        })
    }

    pub fn layout_group(&self) -> Option<&LayoutGroup> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::LayoutGroup(group) => Some(group),
            _ => None,
        })
    }

    pub fn layout_group_mut(&mut self) -> Option<&mut LayoutGroup> {
        self.behaviors.iter_mut().find_map(|b| match b {
            Behavior::LayoutGroup(group) => Some(group),
            _ => None,
        })
    }

    pub fn layout_element(&self) -> Option<&LayoutElement> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::LayoutElement(element) => Some(element),
            _ => None,
        })
    }

    /// Replace the layout element, or add one.
    pub fn set_layout_element(&mut self, element: LayoutElement) {
        for b in self.behaviors.iter_mut() {
            if let Behavior::LayoutElement(existing) = b {
                *existing = element;
                return;
            }
        }
        self.behaviors.push(Behavior::LayoutElement(element));
    }

    pub fn content_size_fitter(&self) -> Option<&ContentSizeFitter> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::ContentSizeFitter(fitter) => Some(fitter),
            _ => None,
        })
    }

    pub fn text(&self) -> Option<&TextBehavior> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn binding(&self) -> Option<&str> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::Binding { key } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn has_mask(&self) -> bool {
        self.behaviors.iter().any(|b| matches!(b, Behavior::Mask))
    }

    pub fn find(&self, id: &NodeId) -> Option<&UiNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut UiNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(UiNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_placement_resolves_to_transform() {
        let t = Transform::new(10.0, 20.0, 30.0, 40.0);
        let (pos, size) = Placement::fixed(&t).resolve(Vec2::new(500.0, 500.0));
        assert_eq!(pos, Vec2::new(10.0, 20.0));
        assert_eq!(size, Vec2::new(30.0, 40.0));
    }

    #[test]
    fn test_stretch_resolves_to_parent() {
        let (pos, size) = Placement::stretch().resolve(Vec2::new(320.0, 240.0));
        assert_eq!(pos, Vec2::ZERO);
        assert_eq!(size, Vec2::new(320.0, 240.0));
    }

    #[test]
    fn test_anchor_preset_positions() {
        for preset in [
            AnchorPreset::UpperLeft,
            AnchorPreset::MiddleCenter,
            AnchorPreset::LowerRight,
            AnchorPreset::UpperCenter,
            AnchorPreset::MiddleLeft,
        ] {
            assert_eq!(
                AnchorPreset::from_positions(preset.horizontal(), preset.vertical()),
                preset
            );
        }
    }

    #[test]
    fn test_set_layout_element_replaces() {
        let mut node = UiNode::new(NodeId::from("1"), "n");
        node.set_layout_element(LayoutElement {
            min_width: Some(5.0),
            ..Default::default()
        });
        node.set_layout_element(LayoutElement {
            flexible_width: Some(1.0),
            ..Default::default()
        });
        assert_eq!(node.behaviors.len(), 1);
        assert_eq!(node.layout_element().and_then(|e| e.min_width), None);
        assert_eq!(node.layout_element().and_then(|e| e.flexible_width), Some(1.0));
    }

    #[test]
    fn test_find_and_count() {
        let mut root = UiNode::new(NodeId::from("0"), "root");
        let mut child = UiNode::new(NodeId::from("1"), "child");
        child.add_child(UiNode::new(NodeId::from("2"), "leaf"));
        root.add_child(child);
        assert_eq!(root.node_count(), 3);
        root.find_mut(&NodeId::from("2")).unwrap().active = false;
        assert!(!root.find(&NodeId::from("2")).unwrap().active);
    }
}
