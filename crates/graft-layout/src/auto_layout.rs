//! Auto-layout translation.
//!
//! Maps a frame's layout mode, alignment, padding, spacing and sizing modes
//! onto a [`LayoutGroup`], a [`ContentSizeFitter`] and per-child
//! [`LayoutElement`]s.

use glam::Vec2;
use graft_core::{
    AnchorPreset, AutoLayout, AxisPosition, ContentSizeFitter, CounterAxisAlign, FitMode,
    LayoutChild, LayoutDirection, LayoutElement, LayoutGroup, LayoutMode, PrimaryAxisAlign,
    SizingMode,
};

/// Which parts of auto-layout translation are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutFeatures {
    pub alignment: bool,
    pub spacing: bool,
    pub child_sizing: bool,
    pub content_sizing: bool,
}

impl Default for LayoutFeatures {
    fn default() -> Self {
        Self::all()
    }
}

impl LayoutFeatures {
    pub fn all() -> Self {
        Self {
            alignment: true,
            spacing: true,
            child_sizing: true,
            content_sizing: true,
        }
    }

    pub fn none() -> Self {
        Self {
            alignment: false,
            spacing: false,
            child_sizing: false,
            content_sizing: false,
        }
    }
}

fn primary_position(align: PrimaryAxisAlign) -> AxisPosition {
    match align {
        PrimaryAxisAlign::Min | PrimaryAxisAlign::SpaceBetween => AxisPosition::Start,
        PrimaryAxisAlign::Center => AxisPosition::Center,
        PrimaryAxisAlign::Max => AxisPosition::End,
    }
}

fn counter_position(align: CounterAxisAlign) -> AxisPosition {
    match align {
        CounterAxisAlign::Min | CounterAxisAlign::Baseline => AxisPosition::Start,
        CounterAxisAlign::Center => AxisPosition::Center,
        CounterAxisAlign::Max => AxisPosition::End,
    }
}

/// Anchor preset for a (primary, counter) alignment pair.
///
/// On a horizontal container the primary axis is x and the counter axis is
/// y; on a vertical container they swap, so `H(p, c) == V(c, p)` whenever
/// the literal positions match. Returns `None` when layout is disabled.
pub fn child_alignment(
    mode: LayoutMode,
    primary: PrimaryAxisAlign,
    counter: CounterAxisAlign,
) -> Option<AnchorPreset> {
    let p = primary_position(primary);
    let c = counter_position(counter);
    match mode {
        LayoutMode::None => None,
        LayoutMode::Horizontal => Some(AnchorPreset::from_positions(p, c)),
        LayoutMode::Vertical => Some(AnchorPreset::from_positions(c, p)),
    }
}

/// Build the layout group for a frame, or `None` when layout is disabled.
///
/// Child control and force-expand flags all start cleared; child sizing
/// turns control on as children are added.
pub fn layout_group(layout: &AutoLayout, features: &LayoutFeatures) -> Option<LayoutGroup> {
    let direction = match layout.mode {
        LayoutMode::None => return None,
        LayoutMode::Horizontal => LayoutDirection::Horizontal,
        LayoutMode::Vertical => LayoutDirection::Vertical,
    };
    let mut group = LayoutGroup::new(direction);

    if features.alignment {
        if let Some(preset) = child_alignment(layout.mode, layout.primary_align, layout.counter_align)
        {
            group.child_alignment = preset;
        }
    }
    if features.spacing {
        group.padding = layout.padding;
        group.spacing = layout.item_spacing;
    }

    tracing::trace!(
        ?direction,
        alignment = ?group.child_alignment,
        spacing = group.spacing,
        "layout group"
    );
    Some(group)
}

/// Size-to-content behavior for the axes that hug their content.
pub fn content_size_fitter(
    layout: &AutoLayout,
    features: &LayoutFeatures,
) -> Option<ContentSizeFitter> {
    if !features.content_sizing {
        return None;
    }
    let (horizontal, vertical) = match layout.mode {
        LayoutMode::None => return None,
        LayoutMode::Horizontal => (layout.primary_sizing, layout.counter_sizing),
        LayoutMode::Vertical => (layout.counter_sizing, layout.primary_sizing),
    };
    let fit = |mode: SizingMode| match mode {
        SizingMode::Auto => FitMode::PreferredSize,
        SizingMode::Fixed => FitMode::Unconstrained,
    };
    let fitter = ContentSizeFitter {
        horizontal_fit: fit(horizontal),
        vertical_fit: fit(vertical),
    };
    (fitter != ContentSizeFitter::default()).then_some(fitter)
}

/// Size hints for one child of a layout group.
///
/// The group takes control of child sizes on both axes. A stretching child
/// gets a flexible weight on the counter axis, otherwise its authored size
/// as minimum. A growing child gets weight 1 and minimum 1 on the primary
/// axis, otherwise its authored size as minimum.
pub fn apply_child_sizing(
    group: &mut LayoutGroup,
    child: &LayoutChild,
    child_size: Vec2,
) -> LayoutElement {
    group.control_child_width = true;
    group.control_child_height = true;

    let (mut primary_min, mut primary_flex) = (Some(child_size.x), None);
    let (mut counter_min, mut counter_flex) = (Some(child_size.y), None);
    if group.direction == LayoutDirection::Vertical {
        primary_min = Some(child_size.y);
        counter_min = Some(child_size.x);
    }

    if child.is_stretch() {
        counter_min = None;
        counter_flex = Some(1.0);
    }
    if child.grows() {
        primary_min = Some(1.0);
        primary_flex = Some(1.0);
    }

    match group.direction {
        LayoutDirection::Horizontal => LayoutElement {
            min_width: primary_min,
            min_height: counter_min,
            flexible_width: primary_flex,
            flexible_height: counter_flex,
        },
        LayoutDirection::Vertical => LayoutElement {
            min_width: counter_min,
            min_height: primary_min,
            flexible_width: counter_flex,
            flexible_height: primary_flex,
        },
    }
}
