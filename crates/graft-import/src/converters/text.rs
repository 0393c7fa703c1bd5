use graft_core::{
    AnchorPreset, AxisPosition, Behavior, Color, ImportError, ImportResult, Node, NodeKind,
    Placement, TextAlignHorizontal, TextAlignVertical, TextBehavior, UiNode,
};

use crate::context::ConversionContext;
use crate::registry::NodeConverter;

/// Text nodes: content, font, size, color and alignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl NodeConverter for TextConverter {
    fn name(&self) -> &str {
        "text"
    }

    fn can_convert(&self, node: &Node, _ctx: &ConversionContext<'_>) -> bool {
        matches!(node.kind, NodeKind::Text(_))
    }

    fn convert(&self, node: &Node, ctx: &mut ConversionContext<'_>) -> ImportResult<UiNode> {
        let NodeKind::Text(text) = &node.kind else {
            return Err(ImportError::convert(&node.id, "not a text node"));
        };
        let mut ui = UiNode::new(node.id.clone(), node.name.clone())
            .with_placement(Placement::fixed(&text.transform));

        let font = ctx.resolve_font(node, &text.style.font_family)?;
        ui.add_behavior(Behavior::Text(TextBehavior {
            content: text.characters.clone(),
            font: font.map(|f| f.name),
            font_size: text.style.font_size,
            color: text.paint.primary_color().unwrap_or(Color::BLACK),
            alignment: text_alignment(text.style.align_horizontal, text.style.align_vertical),
        }));

        if let Some(key) = ctx.localization_key(node, text)? {
            ui.add_behavior(Behavior::Localized { key });
        }
        Ok(ui)
    }
}

fn text_alignment(horizontal: TextAlignHorizontal, vertical: TextAlignVertical) -> AnchorPreset {
    let h = match horizontal {
        TextAlignHorizontal::Left | TextAlignHorizontal::Justified => AxisPosition::Start,
        TextAlignHorizontal::Center => AxisPosition::Center,
        TextAlignHorizontal::Right => AxisPosition::End,
    };
    let v = match vertical {
        TextAlignVertical::Top => AxisPosition::Start,
        TextAlignVertical::Center => AxisPosition::Center,
        TextAlignVertical::Bottom => AxisPosition::End,
    };
    AnchorPreset::from_positions(h, v)
}
