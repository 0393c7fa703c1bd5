//! Rasterizing node geometry into sprite images with 9-slice borders.

use std::io::Cursor;

use glam::Vec2;
use graft_core::{CornerRadii, Paint, PaintStyle, PathGeometry, RasterError, WindingRule};
use image::{ImageFormat, RgbaImage};
use lyon::path::Path;

use crate::gradient::PaintSampler;
use crate::raster::Canvas;
use crate::shapes::{
    ellipse_path, line_path, path_from_commands, polygon_path, rounded_rect_path, star_path, Mesh,
    Tessellator, MAX_POINT_COUNT,
};

/// Texture sampling filter of a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FilterMode {
    Point,
    #[default]
    Bilinear,
    Trilinear,
}

/// Texture addressing outside the 0..1 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
    Mirror,
}

/// Quality settings for generated images.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpriteOptions {
    /// Maximum width or height of a generated image, in pixels
    pub texture_size: u32,
    /// Maximum distance between a curve and its flattened approximation
    pub tessellation_tolerance: f32,
    /// Samples per pixel, rounded up to a square grid
    pub sample_count: u32,
    pub filter_mode: FilterMode,
    pub wrap_mode: WrapMode,
    pub pixels_per_unit: f32,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            texture_size: 1024,
            tessellation_tolerance: 0.5,
            sample_count: 4,
            filter_mode: FilterMode::Bilinear,
            wrap_mode: WrapMode::Clamp,
            pixels_per_unit: 100.0,
        }
    }
}

impl SpriteOptions {
    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tessellation_tolerance = tolerance;
        self
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter_mode = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_mode = wrap;
        self
    }
}

/// Unscaled edge margins of a 9-slice image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderInsets {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl BorderInsets {
    /// Insets in source units for a rounded rectangle.
    ///
    /// Each edge keeps the larger of its two adjacent corner radii and a
    /// stroke-derived padding of `stroke * 2 + 4`.
    pub fn for_rect(radii: &CornerRadii, stroke_weight: f32) -> Self {
        let padding = stroke_weight.max(0.0) * 2.0 + 4.0;
        Self {
            left: radii.top_left.max(radii.bottom_left).max(padding),
            bottom: radii.bottom_left.max(radii.bottom_right).max(padding),
            right: radii.top_right.max(radii.bottom_right).max(padding),
            top: radii.top_left.max(radii.top_right).max(padding),
        }
    }

    pub fn scaled(&self, ratio: f32) -> Self {
        Self {
            left: self.left * ratio,
            bottom: self.bottom * ratio,
            right: self.right * ratio,
            top: self.top * ratio,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Outline of the shape to rasterize, in node-local units.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rect(CornerRadii),
    Ellipse,
    Polygon { point_count: u32 },
    Star { point_count: u32, inner_ratio: f32 },
    /// Stroke-only horizontal segment
    Line,
    Paths(Vec<PathGeometry>),
}

/// Everything needed to rasterize one node.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSource {
    pub name: String,
    pub size: Vec2,
    pub geometry: Geometry,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: f32,
    /// Multiplied into every pixel's alpha
    pub opacity: f32,
    /// Compute 9-slice borders (rectangles only)
    pub sliced: bool,
}

impl VectorSource {
    pub fn new(name: impl Into<String>, size: Vec2, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            size,
            geometry,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: 0.0,
            opacity: 1.0,
            sliced: false,
        }
    }

    pub fn with_style(mut self, style: &PaintStyle) -> Self {
        self.fills = style.fills.clone();
        self.strokes = style.strokes.clone();
        self.stroke_weight = style.stroke_width();
        self.opacity = style.opacity;
        self
    }

    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fills.push(paint);
        self
    }

    pub fn with_stroke(mut self, paint: Paint, weight: f32) -> Self {
        self.strokes.push(paint);
        self.stroke_weight = weight;
        self
    }

    pub fn sliced(mut self) -> Self {
        self.sliced = true;
        self
    }

    fn contours(&self) -> Result<Vec<(Path, WindingRule)>, RasterError> {
        let size = self.size;
        if let Geometry::Polygon { point_count } | Geometry::Star { point_count, .. } =
            &self.geometry
        {
            if *point_count > MAX_POINT_COUNT {
                return Err(RasterError::DegenerateGeometry {
                    reason: format!("{point_count} points exceeds the limit of {MAX_POINT_COUNT}"),
                });
            }
        }
        let contours = match &self.geometry {
            Geometry::Rect(radii) => vec![(rounded_rect_path(size, radii), WindingRule::NonZero)],
            Geometry::Ellipse => vec![(ellipse_path(size), WindingRule::NonZero)],
            Geometry::Polygon { point_count } => {
                vec![(polygon_path(size, *point_count), WindingRule::NonZero)]
            }
            Geometry::Star {
                point_count,
                inner_ratio,
            } => vec![(
                star_path(size, *point_count, *inner_ratio),
                WindingRule::NonZero,
            )],
            Geometry::Line => vec![(line_path(size), WindingRule::NonZero)],
            Geometry::Paths(paths) => paths
                .iter()
                .filter(|p| !p.commands.is_empty())
                .map(|p| (path_from_commands(&p.commands), p.winding))
                .collect(),
        };
        if contours.is_empty() {
            return Err(RasterError::DegenerateGeometry {
                reason: "no path data".into(),
            });
        }
        Ok(contours)
    }
}

/// A generated image ready to be handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorImage {
    pub name: String,
    pub image: RgbaImage,
    /// 9-slice borders in pixels; zero for simple images
    pub borders: BorderInsets,
    /// Pixels per source unit used when rasterizing
    pub scale: f32,
    pub pixels_per_unit: f32,
    pub filter_mode: FilterMode,
    pub wrap_mode: WrapMode,
}

impl VectorImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Rasterize a node into an image no larger than `options.texture_size`.
///
/// Fills are drawn in order, then strokes; later paints land on top. The
/// scale keeps the aspect ratio: `min(max / width, max / height)`.
#[tracing::instrument(skip_all, fields(name = %source.name))]
pub fn rasterize(source: &VectorSource, options: &SpriteOptions) -> Result<VectorImage, RasterError> {
    let contours = source.contours()?;
    let mut tessellator = Tessellator::new(options.tessellation_tolerance);
    let mut layers: Vec<(Mesh, PaintSampler)> = Vec::new();

    for paint in &source.fills {
        let Some(sampler) = PaintSampler::from_paint(paint) else {
            continue;
        };
        let mut mesh = Mesh::new();
        for (path, winding) in &contours {
            mesh.extend(&tessellator.fill(path, *winding)?);
        }
        layers.push((mesh, sampler));
    }
    if source.stroke_weight > 0.0 {
        for paint in source.strokes.iter().filter(|p| p.visible) {
            let Some(sampler) = PaintSampler::from_paint(paint) else {
                continue;
            };
            let mut mesh = Mesh::new();
            for (path, _) in &contours {
                mesh.extend(&tessellator.stroke(path, source.stroke_weight)?);
            }
            layers.push((mesh, sampler));
        }
    }
    if layers.is_empty() {
        return Err(RasterError::EmptyScene);
    }

    let (min, max) = layers
        .iter()
        .filter_map(|(mesh, _)| mesh.bounds())
        .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
        .ok_or_else(|| RasterError::DegenerateGeometry {
            reason: "tessellation produced no triangles".into(),
        })?;
    let extent = max - min;
    if !(extent.x > f32::EPSILON && extent.y > f32::EPSILON) || !extent.is_finite() {
        return Err(RasterError::DegenerateGeometry {
            reason: format!("bounds are {}x{}", extent.x, extent.y),
        });
    }

    let max_dim = options.texture_size as f32;
    let ratio = (max_dim / extent.x).min(max_dim / extent.y);
    let width = ((extent.x * ratio).round() as u32).min(options.texture_size);
    let height = ((extent.y * ratio).round() as u32).min(options.texture_size);
    if width == 0 || height == 0 {
        return Err(RasterError::ZeroSize { width, height });
    }

    let box_size = Vec2::new(
        if source.size.x > 0.0 { source.size.x } else { extent.x },
        if source.size.y > 0.0 { source.size.y } else { extent.y },
    );
    let mut canvas = Canvas::new(width, height, options.sample_count);
    for (mut mesh, sampler) in layers {
        mesh.map(|v| (v - min) * ratio);
        canvas.fill_mesh(&mesh, source.opacity, |p| {
            sampler.color_at((p / ratio + min) / box_size)
        });
    }

    let borders = match (&source.geometry, source.sliced) {
        (Geometry::Rect(radii), true) => {
            BorderInsets::for_rect(radii, source.stroke_weight).scaled(ratio)
        }
        _ => BorderInsets::default(),
    };

    tracing::debug!(width, height, ratio, "rasterized vector image");
    Ok(VectorImage {
        name: source.name.clone(),
        image: canvas.into_image(),
        borders,
        scale: ratio,
        pixels_per_unit: options.pixels_per_unit,
        filter_mode: options.filter_mode,
        wrap_mode: options.wrap_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::{Color, Gradient, PathCommand};
    use proptest::prelude::*;

    fn small() -> SpriteOptions {
        SpriteOptions::default().with_texture_size(64)
    }

    #[test]
    fn test_rect_fits_texture_and_keeps_aspect() {
        let source = VectorSource::new("r", Vec2::new(200.0, 100.0), Geometry::Rect(CornerRadii::default()))
            .with_fill(Paint::solid(Color::rgb(1.0, 0.0, 0.0)));
        let image = rasterize(&source, &small()).unwrap();
        assert_eq!((image.width(), image.height()), (64, 32));
        assert!((image.scale - 0.32).abs() < 1e-5);
        assert_eq!(image.image.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert!(image.borders.is_zero());
    }

    #[test]
    fn test_uniform_radius_borders() {
        let source = VectorSource::new("r", Vec2::new(100.0, 50.0), Geometry::Rect(CornerRadii::uniform(8.0)))
            .with_fill(Paint::solid(Color::WHITE))
            .sliced();
        let image = rasterize(&source, &SpriteOptions::default().with_texture_size(256)).unwrap();
        let expected = 8.0 * image.scale;
        assert!((image.scale - 2.56).abs() < 1e-4);
        for edge in [image.borders.left, image.borders.bottom, image.borders.right, image.borders.top] {
            assert!((edge - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_stroke_padding_dominates_small_radii() {
        let insets = BorderInsets::for_rect(&CornerRadii::new(2.0, 30.0, 1.0, 0.0), 3.0);
        assert_eq!(insets.left, 10.0);
        assert_eq!(insets.top, 30.0);
        assert_eq!(insets.right, 30.0);
        assert_eq!(insets.bottom, 10.0);
    }

    proptest! {
        #[test]
        fn borders_scale_linearly(
            tl in 0.0f32..50.0, tr in 0.0f32..50.0, br in 0.0f32..50.0, bl in 0.0f32..50.0,
            stroke in 0.0f32..10.0, ratio in 0.01f32..20.0,
        ) {
            let radii = CornerRadii::new(tl, tr, br, bl);
            let base = BorderInsets::for_rect(&radii, stroke);
            let scaled = base.scaled(ratio);
            prop_assert!((scaled.left - base.left * ratio).abs() < 1e-3);
            prop_assert!((scaled.top - base.top * ratio).abs() < 1e-3);
            let doubled = base.scaled(ratio * 2.0);
            prop_assert!((doubled.right - scaled.right * 2.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_later_fill_on_top() {
        let source = VectorSource::new("r", Vec2::new(10.0, 10.0), Geometry::Rect(CornerRadii::default()))
            .with_fill(Paint::solid(Color::rgb(1.0, 0.0, 0.0)))
            .with_fill(Paint::solid(Color::rgb(0.0, 0.0, 1.0)));
        let image = rasterize(&source, &small()).unwrap();
        assert_eq!(image.image.get_pixel(32, 32).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_opacity_is_baked() {
        let mut source = VectorSource::new("r", Vec2::new(10.0, 10.0), Geometry::Ellipse)
            .with_fill(Paint::solid(Color::WHITE));
        source.opacity = 0.5;
        let image = rasterize(&source, &small()).unwrap();
        assert_eq!(image.image.get_pixel(32, 32).0[3], 128);
    }

    #[test]
    fn test_linear_gradient_left_to_right() {
        let gradient = Gradient::between(Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5))
            .add_stop(0.0, Color::BLACK)
            .add_stop(1.0, Color::WHITE);
        let source = VectorSource::new("g", Vec2::new(100.0, 100.0), Geometry::Rect(CornerRadii::default()))
            .with_fill(Paint::linear(gradient));
        let image = rasterize(&source, &small()).unwrap();
        let left = image.image.get_pixel(0, 32).0[0];
        let right = image.image.get_pixel(63, 32).0[0];
        assert!(left < 10);
        assert!(right > 245);
    }

    #[test]
    fn test_stroke_grows_bounds() {
        let source = VectorSource::new("s", Vec2::new(60.0, 60.0), Geometry::Rect(CornerRadii::default()))
            .with_stroke(Paint::solid(Color::BLACK), 4.0);
        let image = rasterize(&source, &SpriteOptions::default().with_texture_size(64)).unwrap();
        assert!((image.scale - 1.0).abs() < 1e-5);
        assert_eq!(image.image.get_pixel(32, 32).0[3], 0);
        assert_eq!(image.image.get_pixel(1, 32).0[3], 255);
    }

    #[test]
    fn test_hidden_stroke_and_image_fill_give_empty_scene() {
        let source = VectorSource::new("e", Vec2::new(10.0, 10.0), Geometry::Ellipse)
            .with_fill(Paint::image("hash"))
            .with_stroke(Paint::solid(Color::BLACK).hidden(), 2.0);
        assert!(matches!(rasterize(&source, &small()), Err(RasterError::EmptyScene)));
    }

    #[test]
    fn test_degenerate_geometry() {
        let flat = VectorSource::new("f", Vec2::new(10.0, 0.0), Geometry::Rect(CornerRadii::default()))
            .with_fill(Paint::solid(Color::BLACK));
        assert!(matches!(
            rasterize(&flat, &small()),
            Err(RasterError::DegenerateGeometry { .. })
        ));

        let empty = VectorSource::new("p", Vec2::new(10.0, 10.0), Geometry::Paths(Vec::new()))
            .with_fill(Paint::solid(Color::BLACK));
        assert!(matches!(
            rasterize(&empty, &small()),
            Err(RasterError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_too_many_points_is_degenerate() {
        let star = VectorSource::new(
            "s",
            Vec2::new(10.0, 10.0),
            Geometry::Star {
                point_count: u32::MAX,
                inner_ratio: 0.4,
            },
        )
        .with_fill(Paint::solid(Color::BLACK));
        assert!(matches!(
            rasterize(&star, &small()),
            Err(RasterError::DegenerateGeometry { .. })
        ));

        let polygon = VectorSource::new(
            "p",
            Vec2::new(10.0, 10.0),
            Geometry::Polygon {
                point_count: MAX_POINT_COUNT,
            },
        )
        .with_fill(Paint::solid(Color::BLACK));
        assert!(rasterize(&polygon, &small()).is_ok());
    }

    #[test]
    fn test_sliver_rounds_to_zero_size() {
        let sliver = VectorSource::new("s", Vec2::new(1000.0, 0.2), Geometry::Rect(CornerRadii::default()))
            .with_fill(Paint::solid(Color::BLACK));
        assert!(matches!(
            rasterize(&sliver, &small()),
            Err(RasterError::ZeroSize { width: 64, height: 0 })
        ));
    }

    #[test]
    fn test_path_geometry_and_png() {
        let triangle = PathGeometry::new(vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(20.0, 0.0)),
            PathCommand::LineTo(Vec2::new(10.0, 20.0)),
            PathCommand::Close,
        ]);
        let source = VectorSource::new("t", Vec2::new(20.0, 20.0), Geometry::Paths(vec![triangle]))
            .with_fill(Paint::solid(Color::BLACK));
        let image = rasterize(&source, &small()).unwrap();
        let png = image.encode_png().unwrap();
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_line_is_stroked() {
        let source = VectorSource::new("l", Vec2::new(40.0, 0.0), Geometry::Line)
            .with_stroke(Paint::solid(Color::BLACK), 2.0);
        let image = rasterize(&source, &small()).unwrap();
        assert_eq!(image.width(), 64);
        assert!(image.height() >= 3);
    }
}
