use graft_core::{
    Behavior, FrameNode, ImageType, ImportError, ImportResult, Node, NodeKind, Placement, UiNode,
};
use graft_layout::{content_size_fitter, layout_group};
use graft_render_2d::{Geometry, VectorSource};

use super::attach_image;
use crate::context::ConversionContext;
use crate::registry::NodeConverter;

/// Frames: sliced background image, clip mask, auto-layout and children.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameConverter;

impl NodeConverter for FrameConverter {
    fn name(&self) -> &str {
        "frame"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(node.kind, NodeKind::Frame(_))
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let NodeKind::Frame(frame) = &node.kind else {
            return Err(ImportError::convert(&node.id, "not a frame"));
        };
        convert_frame(node, frame, ctx)
    }
}

/// Component instances, converted like frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceConverter;

impl NodeConverter for InstanceConverter {
    fn name(&self) -> &str {
        "instance"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(node.kind, NodeKind::Instance(_))
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let NodeKind::Instance(instance) = &node.kind else {
            return Err(ImportError::convert(&node.id, "not an instance"));
        };
        if let Some(component) = &instance.component_id {
            if !ctx.document().components.contains_key(component) {
                ctx.error(node, format!("component '{component}' is missing from the document"))?;
            }
        }
        convert_frame(node, &instance.frame, ctx)
    }
}

fn convert_frame(
    node: &Node,
    frame: &FrameNode,
    ctx: &mut ConversionContext<'_>,
) -> ImportResult<UiNode> {
    let mut ui = UiNode::new(node.id.clone(), node.name.clone())
        .with_placement(Placement::fixed(&frame.transform));

    let source = VectorSource::new(
        node.name.clone(),
        frame.transform.size,
        Geometry::Rect(frame.corner_radii),
    )
    .with_style(&frame.paint)
    .sliced();
    attach_image(ctx, node, &mut ui, &frame.paint, source, ImageType::Sliced);

    if frame.clips_content {
        ui.add_behavior(Behavior::Mask);
    }

    if let Some(layout) = node.auto_layout() {
        let features = ctx.options().layout;
        if let Some(group) = layout_group(layout, &features) {
            ui.add_behavior(Behavior::LayoutGroup(group));
        }
        if let Some(fitter) = content_size_fitter(layout, &features) {
            ui.add_behavior(Behavior::ContentSizeFitter(fitter));
        }
    }

    ctx.build_children(node, &mut ui)?;
    Ok(ui)
}
