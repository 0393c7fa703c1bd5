//! Caller-supplied post-processing hooks.

use graft_core::{Effect, EffectBehavior, EffectKind, ImportError, ImportResult, Node, TextNode};

/// Chooses a localization key for text nodes.
pub trait LocalizationConverter: Send + Sync {
    fn name(&self) -> &str;

    /// Key for this text, or `None` to leave it unlocalized.
    fn localization_key(&self, node: &Node, text: &TextNode) -> ImportResult<Option<String>>;
}

/// Turns a visual effect into an output behavior.
pub trait EffectConverter: Send + Sync {
    fn name(&self) -> &str;

    fn can_convert(&self, effect: &Effect) -> bool;

    fn convert(&self, node: &Node, effect: &Effect) -> ImportResult<EffectBehavior>;
}

/// Carries drop and inner shadows through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowEffectConverter;

impl EffectConverter for ShadowEffectConverter {
    fn name(&self) -> &str {
        "shadow"
    }

    fn can_convert(&self, effect: &Effect) -> bool {
        matches!(effect.kind, EffectKind::DropShadow | EffectKind::InnerShadow)
    }

    fn convert(&self, node: &Node, effect: &Effect) -> ImportResult<EffectBehavior> {
        if effect.color.is_none() {
            return Err(ImportError::Hook {
                hook: self.name().to_string(),
                message: format!("shadow on {} has no color", node.id),
            });
        }
        Ok(EffectBehavior {
            converter: self.name().to_string(),
            effect: effect.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use graft_core::{Color, FrameNode, Transform};

    fn node() -> Node {
        Node::frame("1:1", "Card", FrameNode::new(Transform::sized(10.0, 10.0)))
    }

    #[test]
    fn test_shadow_accepts_shadows_only() {
        let shadow = Effect::drop_shadow(Vec2::new(0.0, 2.0), 4.0, Color::BLACK);
        assert!(ShadowEffectConverter.can_convert(&shadow));
        assert!(!ShadowEffectConverter.can_convert(&Effect::layer_blur(3.0)));

        let behavior = ShadowEffectConverter.convert(&node(), &shadow).unwrap();
        assert_eq!(behavior.converter, "shadow");
        assert_eq!(behavior.effect, shadow);
    }

    #[test]
    fn test_colorless_shadow_is_hook_error() {
        let mut shadow = Effect::drop_shadow(Vec2::ZERO, 4.0, Color::BLACK);
        shadow.color = None;
        let err = ShadowEffectConverter.convert(&node(), &shadow).unwrap_err();
        assert!(matches!(err, ImportError::Hook { .. }));
    }
}
