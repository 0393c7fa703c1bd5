use graft_core::{ImportResult, Node, NodeKind, Placement, UiNode};

use crate::context::ConversionContext;
use crate::registry::NodeConverter;

/// Catch-all for node kinds without a dedicated converter.
///
/// Only nodes that still carry a transform are accepted; they become plain
/// containers holding their converted children.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownConverter;

impl NodeConverter for UnknownConverter {
    fn name(&self) -> &str {
        "unknown"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(
            node.kind,
            NodeKind::Other {
                transform: Some(_),
                ..
            }
        )
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let mut ui = UiNode::new(node.id.clone(), node.name.clone());
        if let Some(transform) = node.transform() {
            ui.placement = Placement::fixed(transform);
        }
        ctx.warn(
            node,
            format!("unsupported node type {}, converted as a container", node.type_name()),
        );
        ctx.build_children(node, &mut ui)?;
        Ok(ui)
    }
}
