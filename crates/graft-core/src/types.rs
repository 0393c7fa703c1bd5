//! Core value types shared by the document model and the output tree.

use std::fmt;

use glam::Vec2;

/// Stable identifier of a source node, carried over 1:1 to the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A color value with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit RGB values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Create from hex string (e.g., "#FF5733" or "FF5733CC").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .map(|v| v as f32 / 255.0)
        };
        match hex.len() {
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Return the same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert to 8-bit RGBA tuple.
    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b), q(self.a))
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Position, size and rotation of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Top-left corner relative to the parent's top-left corner
    pub position: Vec2,
    pub size: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
}

impl Transform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
            rotation: 0.0,
        }
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Independent radius for each corner of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub fn uniform(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }

    /// Clamp every radius so that adjacent corners never overlap.
    pub fn clamped(&self, size: Vec2) -> Self {
        let limit = (size.x.min(size.y) / 2.0).max(0.0);
        let clamp = |r: f32| r.max(0.0).min(limit);
        Self {
            top_left: clamp(self.top_left),
            top_right: clamp(self.top_right),
            bottom_right: clamp(self.bottom_right),
            bottom_left: clamp(self.bottom_left),
        }
    }
}

/// Padding on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    /// Create uniform padding.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// A single color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub position: f32,
    pub color: Color,
}

/// Gradient geometry and stops.
///
/// Handle positions are in the node's normalized space: (0, 0) is the
/// top-left corner of the node's box and (1, 1) the bottom-right one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gradient {
    pub handle_positions: Vec<Vec2>,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// A gradient running from `start` to `end` in normalized node space.
    pub fn between(start: Vec2, end: Vec2) -> Self {
        Self {
            handle_positions: vec![start, end],
            stops: Vec::new(),
        }
    }

    pub fn add_stop(mut self, position: f32, color: Color) -> Self {
        self.stops.push(GradientStop { position, color });
        self
    }
}

/// What a paint draws.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaintKind {
    Solid(Color),
    LinearGradient(Gradient),
    RadialGradient(Gradient),
    /// A bitmap fill referencing an image by hash; never rasterized here.
    Image { image_ref: String },
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Paint {
    pub kind: PaintKind,
    pub opacity: f32,
    pub visible: bool,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self::from_kind(PaintKind::Solid(color))
    }

    pub fn linear(gradient: Gradient) -> Self {
        Self::from_kind(PaintKind::LinearGradient(gradient))
    }

    pub fn radial(gradient: Gradient) -> Self {
        Self::from_kind(PaintKind::RadialGradient(gradient))
    }

    pub fn image(image_ref: impl Into<String>) -> Self {
        Self::from_kind(PaintKind::Image {
            image_ref: image_ref.into(),
        })
    }

    fn from_kind(kind: PaintKind) -> Self {
        Self {
            kind,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, PaintKind::Image { .. })
    }
}

/// Fill, stroke and opacity of a paintable node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaintStyle {
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: Option<f32>,
    pub opacity: f32,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: None,
            opacity: 1.0,
        }
    }
}

impl PaintStyle {
    pub fn has_paint(&self) -> bool {
        !self.fills.is_empty() || !self.strokes.is_empty()
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_weight.unwrap_or(0.0).max(0.0)
    }

    /// First visible solid fill, with the paint opacity applied.
    pub fn primary_color(&self) -> Option<Color> {
        self.fills.iter().find_map(|paint| match paint.kind {
            PaintKind::Solid(color) if paint.visible => Some(color.with_opacity(paint.opacity)),
            _ => None,
        })
    }
}

/// Fill rule of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// A path drawing command, in node-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { control: Vec2, end: Vec2 },
    CubicTo { control1: Vec2, control2: Vec2, end: Vec2 },
    Close,
}

/// One closed or open outline of a vector node.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathGeometry {
    pub commands: Vec<PathCommand>,
    pub winding: WindingRule,
}

impl PathGeometry {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self {
            commands,
            winding: WindingRule::NonZero,
        }
    }

    pub fn with_winding(mut self, winding: WindingRule) -> Self {
        self.winding = winding;
        self
    }

    /// A closed polygon through `points`.
    pub fn polygon(points: &[Vec2]) -> Self {
        let mut commands = Vec::with_capacity(points.len() + 1);
        for (i, p) in points.iter().enumerate() {
            commands.push(if i == 0 {
                PathCommand::MoveTo(*p)
            } else {
                PathCommand::LineTo(*p)
            });
        }
        if !points.is_empty() {
            commands.push(PathCommand::Close);
        }
        Self::new(commands)
    }
}

/// Kind of a visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
}

/// A visual effect attached to a node (shadow or blur).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub kind: EffectKind,
    pub visible: bool,
    pub radius: f32,
    pub color: Option<Color>,
    pub offset: Vec2,
    pub spread: f32,
}

impl Effect {
    pub fn drop_shadow(offset: Vec2, radius: f32, color: Color) -> Self {
        Self {
            kind: EffectKind::DropShadow,
            visible: true,
            radius,
            color: Some(color),
            offset,
            spread: 0.0,
        }
    }

    pub fn layer_blur(radius: f32) -> Self {
        Self {
            kind: EffectKind::LayerBlur,
            visible: true,
            radius,
            color: None,
            offset: Vec2::ZERO,
            spread: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#FF0000").unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));

        let c = Color::from_hex("00FF0080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);

        assert!(Color::from_hex("#FFF").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
    }

    #[test]
    fn test_corner_radii_clamped() {
        let radii = CornerRadii::new(100.0, 5.0, -3.0, 20.0).clamped(Vec2::new(40.0, 30.0));
        assert_eq!(radii.top_left, 15.0);
        assert_eq!(radii.top_right, 5.0);
        assert_eq!(radii.bottom_right, 0.0);
        assert_eq!(radii.bottom_left, 15.0);
    }

    #[test]
    fn test_primary_color_skips_hidden_and_gradients() {
        let style = PaintStyle {
            fills: vec![
                Paint::solid(Color::WHITE).hidden(),
                Paint::linear(Gradient::default()),
                Paint::solid(Color::rgb(0.0, 0.0, 1.0)).with_opacity(0.5),
            ],
            ..Default::default()
        };
        assert_eq!(style.primary_color(), Some(Color::rgba(0.0, 0.0, 1.0, 0.5)));
    }

    #[test]
    fn test_polygon_path_is_closed() {
        let path = PathGeometry::polygon(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(path.commands.len(), 4);
        assert_eq!(path.commands.last(), Some(&PathCommand::Close));
    }
}
