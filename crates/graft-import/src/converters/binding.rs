use graft_core::{Behavior, ImportError, ImportResult, Node, UiNode};

use crate::context::ConversionContext;
use crate::registry::{ConverterKind, NodeConverter};

/// Binds nodes carrying a given binding key to a caller-side behavior.
///
/// The node is built by the structural converters and then tagged with a
/// [`Behavior::Binding`]. The key is looked up on the node, then on its
/// component, then on the component set.
#[derive(Debug, Clone)]
pub struct BindingConverter {
    key: String,
    name: String,
}

impl BindingConverter {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: format!("binding:{key}"),
            key,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl NodeConverter for BindingConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ConverterKind {
        ConverterKind::Behavior
    }

    fn can_convert(&self, node: &Node, ctx: &ConversionContext<'_>) -> bool {
        ctx.document().binding_key(node) == Some(self.key.as_str())
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let Some(mut ui) = ctx.convert_structural(node)? else {
            return Err(ImportError::convert(
                &node.id,
                format!("no converter builds {} nodes", node.type_name()),
            ));
        };
        ui.add_behavior(Behavior::Binding {
            key: self.key.clone(),
        });
        Ok(ui)
    }
}
