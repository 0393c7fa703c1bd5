//! Default node converters.
//!
//! One structural converter per node kind, a catch-all for unsupported
//! kinds, and [`BindingConverter`] for nodes bound by key.

mod binding;
mod frame;
mod group;
mod shape;
mod text;
mod unknown;

pub use binding::BindingConverter;
pub use frame::{FrameConverter, InstanceConverter};
pub use group::GroupConverter;
pub use shape::{
    EllipseConverter, LineConverter, PolygonConverter, RectangleConverter, StarConverter,
    VectorConverter,
};
pub use text::TextConverter;
pub use unknown::UnknownConverter;

use graft_core::{Behavior, Color, ImageBehavior, ImageType, Node, Paint, PaintStyle, UiNode};
use graft_render_2d::VectorSource;

use crate::context::ConversionContext;

/// Rasterize a node's paint and attach the image to `ui`.
///
/// Image paints are skipped. A node with a hidden fill keeps its image but
/// the image starts disabled.
pub(crate) fn attach_image(
    ctx: &mut ConversionContext<'_>,
    node: &Node,
    ui: &mut UiNode,
    style: &PaintStyle,
    source: VectorSource,
    image_type: ImageType,
) {
    if !style.has_paint() {
        return;
    }
    let paints = || style.fills.iter().chain(style.strokes.iter());
    if paints().any(Paint::is_image) {
        ctx.warn(node, "image paints are not supported and were skipped");
    }
    if paints().all(Paint::is_image) {
        return;
    }

    let hidden_fill = style.fills.iter().any(|p| !p.visible);
    if hidden_fill && style.fills.len() > 1 {
        ctx.warn(
            node,
            "several fills with some hidden are baked into one image; the image is disabled",
        );
    }

    let Some(asset_key) = ctx.rasterize(node, &source) else {
        return;
    };
    ui.add_behavior(Behavior::Image(ImageBehavior {
        asset_key,
        image_type,
        tint: Color::WHITE,
        enabled: !hidden_fill,
    }));
}
