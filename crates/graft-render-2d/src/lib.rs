//! Vector rasterization for the Graft design importer.
//!
//! Turns filled and stroked node geometry into bitmap images:
//!
//! 1. **Contours**: rounded rectangles, ellipses, regular polygons, stars
//!    and arbitrary paths are built as lyon paths in node-local units.
//! 2. **Tessellation**: one mesh per fill paint and one per stroke paint,
//!    honoring a configurable tolerance.
//! 3. **Rasterization**: meshes are scaled to fit the maximum texture size
//!    and drawn with a supersampling software rasterizer, later paints on
//!    top.
//! 4. **Borders**: rectangles meant for 9-slice reuse get border insets
//!    derived from their corner radii and stroke width.

mod gradient;
mod raster;
mod shapes;
mod sprite;

pub use gradient::{gradient_angle, gradient_axis_angle, sample_gradient_stops, PaintSampler};
pub use raster::Canvas;
pub use shapes::{
    ellipse_path, line_path, path_from_commands, polygon_path, rounded_rect_path, star_path,
    Mesh, Tessellator, MAX_POINT_COUNT,
};
pub use sprite::{
    rasterize, BorderInsets, FilterMode, Geometry, SpriteOptions, VectorImage, VectorSource,
    WrapMode,
};
