//! Layout translation for the Graft design importer.
//!
//! The design tool describes layout in two ways, and this crate maps both
//! onto the anchor/size primitives of the output tree:
//!
//! 1. **Auto-layout**: flex-like frames (direction, alignment, padding,
//!    spacing, hug/fixed sizing, per-child stretch and grow) become a
//!    layout group, per-child layout elements and content size fitters.
//! 2. **Constraints**: children of non-layout containers keep their authored
//!    rectangle through anchors and offsets chosen from their horizontal and
//!    vertical resize constraints.
//!
//! All values are set once from the source data. Nothing is iterated or
//! solved here, so hug-content containers with stretching children compose
//! without feedback loops.

mod auto_layout;
mod constraints;

pub use auto_layout::{
    apply_child_sizing, child_alignment, content_size_fitter, layout_group, LayoutFeatures,
};
pub use constraints::constrained_placement;
