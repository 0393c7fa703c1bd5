//! Contour construction and tessellation.

use std::f32::consts::PI;

use glam::Vec2;
use graft_core::{CornerRadii, PathCommand, RasterError, WindingRule};
use lyon::geom::{point, vector, Angle, Box2D};
use lyon::path::builder::BorderRadii;
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, LineJoin, StrokeOptions,
    StrokeTessellator, StrokeVertex, VertexBuffers,
};

/// Tessellated triangles.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, re-basing its indices.
    pub fn extend(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Axis-aligned bounds of the referenced vertices.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut iter = self.indices.iter().map(|&i| self.vertices[i as usize]);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Map every vertex through `f`.
    pub fn map(&mut self, f: impl Fn(Vec2) -> Vec2) {
        for v in self.vertices.iter_mut() {
            *v = f(*v);
        }
    }
}

/// Fill and stroke tessellator with a fixed tolerance.
pub struct Tessellator {
    fill_tessellator: FillTessellator,
    stroke_tessellator: StrokeTessellator,
    tolerance: f32,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Tessellator {
    pub fn new(tolerance: f32) -> Self {
        Self {
            fill_tessellator: FillTessellator::new(),
            stroke_tessellator: StrokeTessellator::new(),
            tolerance: tolerance.max(0.001),
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn fill(&mut self, path: &Path, winding: WindingRule) -> Result<Mesh, RasterError> {
        let rule = match winding {
            WindingRule::NonZero => FillRule::NonZero,
            WindingRule::EvenOdd => FillRule::EvenOdd,
        };
        let options = FillOptions::tolerance(self.tolerance).with_fill_rule(rule);
        let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();

        self.fill_tessellator
            .tessellate_path(
                path,
                &options,
                &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                    Vec2::new(vertex.position().x, vertex.position().y)
                }),
            )
            .map_err(|e| RasterError::Tessellation(format!("{:?}", e)))?;

        Ok(Mesh {
            vertices: buffers.vertices,
            indices: buffers.indices,
        })
    }

    pub fn stroke(&mut self, path: &Path, width: f32) -> Result<Mesh, RasterError> {
        let options = StrokeOptions::tolerance(self.tolerance)
            .with_line_width(width)
            .with_line_join(LineJoin::Miter);
        let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();

        self.stroke_tessellator
            .tessellate_path(
                path,
                &options,
                &mut BuffersBuilder::new(&mut buffers, |vertex: StrokeVertex| {
                    Vec2::new(vertex.position().x, vertex.position().y)
                }),
            )
            .map_err(|e| RasterError::Tessellation(format!("{:?}", e)))?;

        Ok(Mesh {
            vertices: buffers.vertices,
            indices: buffers.indices,
        })
    }
}

/// Rectangle of `size` at the origin with independent corner radii.
pub fn rounded_rect_path(size: Vec2, radii: &CornerRadii) -> Path {
    let radii = radii.clamped(size);
    let mut builder = Path::builder();
    let rect = Box2D::new(point(0.0, 0.0), point(size.x, size.y));

    if radii.is_zero() {
        builder.add_rectangle(&rect, Winding::Positive);
    } else {
        let border = BorderRadii {
            top_left: radii.top_left,
            top_right: radii.top_right,
            bottom_left: radii.bottom_left,
            bottom_right: radii.bottom_right,
        };
        builder.add_rounded_rectangle(&rect, &border, Winding::Positive);
    }
    builder.build()
}

/// Ellipse inscribed in a box of `size` at the origin.
pub fn ellipse_path(size: Vec2) -> Path {
    let mut builder = Path::builder();
    let half = size / 2.0;
    builder.add_ellipse(
        point(half.x, half.y),
        vector(half.x, half.y),
        Angle::zero(),
        Winding::Positive,
    );
    builder.build()
}

/// Horizontal segment across the box, vertically centered.
pub fn line_path(size: Vec2) -> Path {
    let mut builder = Path::builder();
    let y = size.y / 2.0;
    builder.begin(point(0.0, y));
    builder.line_to(point(size.x, y));
    builder.end(false);
    builder.build()
}

fn closed_polygon(points: impl IntoIterator<Item = Vec2>) -> Path {
    let mut builder = Path::builder();
    let mut started = false;
    for p in points {
        if started {
            builder.line_to(point(p.x, p.y));
        } else {
            builder.begin(point(p.x, p.y));
            started = true;
        }
    }
    if started {
        builder.close();
    }
    builder.build()
}

/// Largest vertex count accepted for polygons and stars.
pub const MAX_POINT_COUNT: u32 = 1024;

/// Regular polygon inscribed in the box, first vertex at the top.
///
/// `point_count` is clamped to `3..=MAX_POINT_COUNT`.
pub fn polygon_path(size: Vec2, point_count: u32) -> Path {
    let n = point_count.clamp(3, MAX_POINT_COUNT);
    let center = size / 2.0;
    closed_polygon((0..n).map(|i| {
        let angle = -PI / 2.0 + 2.0 * PI * i as f32 / n as f32;
        center + Vec2::new(angle.cos(), angle.sin()) * center
    }))
}

/// Star inscribed in the box, alternating outer and inner vertices.
///
/// `inner_ratio` is the inner radius as a fraction of the outer one.
/// `point_count` is clamped to `3..=MAX_POINT_COUNT`.
pub fn star_path(size: Vec2, point_count: u32, inner_ratio: f32) -> Path {
    let n = point_count.clamp(3, MAX_POINT_COUNT);
    let center = size / 2.0;
    let inner = inner_ratio.clamp(0.0, 1.0);
    closed_polygon((0..n * 2).map(|i| {
        let angle = -PI / 2.0 + PI * i as f32 / n as f32;
        let radius = if i % 2 == 0 { center } else { center * inner };
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    }))
}

/// Build a path from drawing commands.
///
/// Drawing without a preceding move starts at the current point, and a move
/// while a subpath is open ends that subpath first.
pub fn path_from_commands(commands: &[PathCommand]) -> Path {
    let mut builder = Path::builder();
    let mut open = false;
    let mut start = Vec2::ZERO;
    let mut current = Vec2::ZERO;

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => {
                if open {
                    builder.end(false);
                }
                builder.begin(point(p.x, p.y));
                open = true;
                start = p;
                current = p;
                continue;
            }
            PathCommand::Close => {
                if open {
                    builder.close();
                    open = false;
                }
                current = start;
                continue;
            }
            _ => {}
        }

        if !open {
            builder.begin(point(current.x, current.y));
            open = true;
            start = current;
        }
        match *cmd {
            PathCommand::LineTo(p) => {
                builder.line_to(point(p.x, p.y));
                current = p;
            }
            PathCommand::QuadTo { control, end } => {
                builder.quadratic_bezier_to(point(control.x, control.y), point(end.x, end.y));
                current = end;
            }
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => {
                builder.cubic_bezier_to(
                    point(control1.x, control1.y),
                    point(control2.x, control2.y),
                    point(end.x, end.y),
                );
                current = end;
            }
            PathCommand::MoveTo(_) | PathCommand::Close => {}
        }
    }
    if open {
        builder.end(false);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_bounds() {
        let mut tessellator = Tessellator::new(0.5);
        let path = rounded_rect_path(Vec2::new(100.0, 50.0), &CornerRadii::default());
        let mesh = tessellator.fill(&path, WindingRule::NonZero).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.bounds(), Some((Vec2::ZERO, Vec2::new(100.0, 50.0))));
    }

    #[test]
    fn test_fill_rounded_rect() {
        let mut tessellator = Tessellator::new(0.5);
        let path = rounded_rect_path(Vec2::new(100.0, 50.0), &CornerRadii::uniform(10.0));
        let mesh = tessellator.fill(&path, WindingRule::NonZero).unwrap();
        assert!(mesh.triangle_count() > 2);
        let (min, max) = mesh.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec2::ZERO, 0.01));
        assert!(max.abs_diff_eq(Vec2::new(100.0, 50.0), 0.01));
    }

    #[test]
    fn test_finer_tolerance_adds_triangles() {
        let path = ellipse_path(Vec2::new(200.0, 200.0));
        let coarse = Tessellator::new(2.0).fill(&path, WindingRule::NonZero).unwrap();
        let fine = Tessellator::new(0.05).fill(&path, WindingRule::NonZero).unwrap();
        assert!(fine.triangle_count() > coarse.triangle_count());
    }

    #[test]
    fn test_stroke_extends_beyond_outline() {
        let mut tessellator = Tessellator::new(0.5);
        let path = rounded_rect_path(Vec2::new(40.0, 40.0), &CornerRadii::default());
        let mesh = tessellator.stroke(&path, 4.0).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!((min.x + 2.0).abs() < 0.01);
        assert!((max.y - 42.0).abs() < 0.01);
    }

    #[test]
    fn test_line_only_strokes() {
        let mut tessellator = Tessellator::new(0.5);
        let path = line_path(Vec2::new(30.0, 0.0));
        assert!(tessellator.fill(&path, WindingRule::NonZero).unwrap().is_empty());
        assert!(!tessellator.stroke(&path, 2.0).unwrap().is_empty());
    }

    #[test]
    fn test_commands_with_implicit_begin_and_open_subpath() {
        let commands = [
            PathCommand::LineTo(Vec2::new(10.0, 0.0)),
            PathCommand::LineTo(Vec2::new(10.0, 10.0)),
            PathCommand::MoveTo(Vec2::new(20.0, 0.0)),
            PathCommand::LineTo(Vec2::new(30.0, 0.0)),
            PathCommand::LineTo(Vec2::new(30.0, 10.0)),
            PathCommand::Close,
        ];
        let path = path_from_commands(&commands);
        let mesh = Tessellator::new(0.5)
            .fill(&path, WindingRule::NonZero)
            .unwrap();
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_star_and_polygon_stay_in_box() {
        let size = Vec2::new(50.0, 40.0);
        let mut tessellator = Tessellator::new(0.5);
        for path in [polygon_path(size, 6), star_path(size, 5, 0.38)] {
            let mesh = tessellator.fill(&path, WindingRule::NonZero).unwrap();
            let (min, max) = mesh.bounds().unwrap();
            assert!(min.x >= -0.01 && min.y >= -0.01);
            assert!(max.x <= size.x + 0.01 && max.y <= size.y + 0.01);
        }
    }

    #[test]
    fn test_huge_point_counts_are_clamped() {
        let size = Vec2::new(10.0, 10.0);
        let star = star_path(size, u32::MAX / 2 + 1, 0.4);
        assert_eq!(star.iter().count(), MAX_POINT_COUNT as usize * 2 + 1);
        let polygon = polygon_path(size, u32::MAX);
        assert_eq!(polygon.iter().count(), MAX_POINT_COUNT as usize + 1);
    }
}
