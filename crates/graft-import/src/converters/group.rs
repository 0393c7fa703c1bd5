use graft_core::{ImportError, ImportResult, Node, NodeKind, Placement, UiNode};

use crate::context::ConversionContext;
use crate::registry::NodeConverter;

/// Groups become plain containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupConverter;

impl NodeConverter for GroupConverter {
    fn name(&self) -> &str {
        "group"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(node.kind, NodeKind::Group(_))
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let NodeKind::Group(group) = &node.kind else {
            return Err(ImportError::convert(&node.id, "not a group"));
        };
        let mut ui = UiNode::new(node.id.clone(), node.name.clone())
            .with_placement(Placement::fixed(&group.transform));
        ctx.build_children(node, &mut ui)?;
        Ok(ui)
    }
}
