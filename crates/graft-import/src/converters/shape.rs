use graft_core::{
    ImageType, ImportError, ImportResult, Node, NodeKind, Placement, UiNode, VectorNode,
};
use graft_render_2d::{Geometry, VectorSource};

use super::attach_image;
use crate::context::ConversionContext;
use crate::registry::NodeConverter;

const DEFAULT_POLYGON_POINTS: u32 = 3;
const DEFAULT_STAR_POINTS: u32 = 5;
const DEFAULT_STAR_INNER_RATIO: f32 = 0.38;

/// Rectangles: a sliced image with per-corner radii.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleConverter;

impl NodeConverter for RectangleConverter {
    fn name(&self) -> &str {
        "rectangle"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(node.kind, NodeKind::Rectangle(_))
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let NodeKind::Rectangle(rect) = &node.kind else {
            return Err(ImportError::convert(&node.id, "not a rectangle"));
        };
        let mut ui = UiNode::new(node.id.clone(), node.name.clone())
            .with_placement(Placement::fixed(&rect.transform));
        let source = VectorSource::new(
            node.name.clone(),
            rect.transform.size,
            Geometry::Rect(rect.corner_radii),
        )
        .with_style(&rect.paint)
        .sliced();
        attach_image(ctx, node, &mut ui, &rect.paint, source, ImageType::Sliced);
        Ok(ui)
    }
}

/// Outline used when a path-based node carries no path data.
fn fallback_geometry(node: &Node, data: &VectorNode) -> Geometry {
    match node.kind {
        NodeKind::Ellipse(_) => Geometry::Ellipse,
        NodeKind::Line(_) => Geometry::Line,
        NodeKind::Polygon(_) => Geometry::Polygon {
            point_count: data.point_count.unwrap_or(DEFAULT_POLYGON_POINTS),
        },
        NodeKind::Star(_) => Geometry::Star {
            point_count: data.point_count.unwrap_or(DEFAULT_STAR_POINTS),
            inner_ratio: data.inner_radius.unwrap_or(DEFAULT_STAR_INNER_RATIO),
        },
        _ => Geometry::Paths(Vec::new()),
    }
}

fn convert_vector(node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
    let Some(data) = node.vector_data() else {
        return Err(ImportError::convert(&node.id, "node has no vector data"));
    };
    let mut ui = UiNode::new(node.id.clone(), node.name.clone())
        .with_placement(Placement::fixed(&data.transform));

    let geometry = if data.geometry.is_empty() {
        fallback_geometry(node, data)
    } else {
        Geometry::Paths(data.geometry.clone())
    };
    let mut source =
        VectorSource::new(node.name.clone(), data.transform.size, geometry).with_style(&data.paint);
    if matches!(node.kind, NodeKind::Line(_)) {
        source.fills.clear();
    }
    attach_image(ctx, node, &mut ui, &data.paint, source, ImageType::Simple);
    Ok(ui)
}

macro_rules! vector_converter {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NodeConverter for $name {
            fn name(&self) -> &str {
                $label
            }

            fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
                matches!(node.kind, NodeKind::$variant(_))
            }

            fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
                convert_vector(node, ctx)
            }
        }
    };
}

vector_converter!(
    /// Free-form vector paths.
    VectorConverter,
    Vector,
    "vector"
);
vector_converter!(EllipseConverter, Ellipse, "ellipse");
vector_converter!(
    /// Lines are stroked only.
    LineConverter,
    Line,
    "line"
);
vector_converter!(PolygonConverter, Polygon, "polygon");
vector_converter!(StarConverter, Star, "star");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AssetTables;
    use crate::options::ImportOptions;
    use crate::registry::ConverterRegistry;
    use graft_core::{Color, Document, Paint, PaintStyle, Transform};
    use graft_render_2d::SpriteOptions;

    fn filled() -> PaintStyle {
        PaintStyle {
            fills: vec![Paint::solid(Color::rgb(0.2, 0.4, 0.8))],
            ..PaintStyle::default()
        }
    }

    fn convert(node: &Node) -> (Option<UiNode>, AssetTables, usize) {
        let document = Document::new("doc");
        let registry = ConverterRegistry::with_defaults();
        let options =
            ImportOptions::new().with_sprite(SpriteOptions::default().with_texture_size(64));
        let mut tables = AssetTables::new();
        let mut ctx = ConversionContext::new(&registry, &document, &options, &mut tables);
        let ui = ctx.convert_node(node).unwrap();
        let warnings = ctx.take_logs().len();
        drop(ctx);
        (ui, tables, warnings)
    }

    #[test]
    fn test_star_without_paths_uses_generated_outline() {
        let node = Node::new(
            "1:1",
            "Star",
            NodeKind::Star(VectorNode::new(Transform::sized(40.0, 40.0)).with_paint(filled())),
        );
        let (ui, tables, warnings) = convert(&node);
        let ui = ui.unwrap();
        let image = ui.image().unwrap();
        assert_eq!(image.image_type, ImageType::Simple);
        assert!(image.enabled);
        assert!(tables.assets.contains("1:1"));
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_line_ignores_fills() {
        let mut paint = filled();
        paint.strokes.push(Paint::solid(Color::BLACK));
        paint.stroke_weight = Some(2.0);
        let node = Node::new(
            "1:1",
            "Divider",
            NodeKind::Line(VectorNode::new(Transform::sized(60.0, 0.0)).with_paint(paint)),
        );
        let (ui, tables, _) = convert(&node);
        assert!(ui.unwrap().image().is_some());
        let image = tables.assets.get("1:1").unwrap();
        assert_eq!(image.width(), 64);
    }

    #[test]
    fn test_empty_vector_logs_and_continues() {
        let node = Node::vector(
            "1:1",
            "Empty",
            VectorNode::new(Transform::sized(10.0, 10.0)).with_paint(filled()),
        );
        let (ui, tables, warnings) = convert(&node);
        assert!(ui.unwrap().image().is_none());
        assert!(tables.assets.is_empty());
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_unpainted_shape_has_no_image() {
        let node = Node::new(
            "1:1",
            "Ghost",
            NodeKind::Ellipse(VectorNode::new(Transform::sized(10.0, 10.0))),
        );
        let (ui, tables, warnings) = convert(&node);
        assert!(ui.unwrap().image().is_none());
        assert!(tables.assets.is_empty());
        assert_eq!(warnings, 0);
    }
}
