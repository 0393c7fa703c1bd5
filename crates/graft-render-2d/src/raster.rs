//! Supersampling software rasterizer.

use glam::Vec2;
use graft_core::Color;
use image::RgbaImage;

use crate::shapes::Mesh;

/// Upper bound for the subsample grid; a pixel's samples must fit in a u64 mask.
const MAX_GRID: u32 = 8;

/// A straight-alpha RGBA float canvas.
///
/// Each call to [`Canvas::fill_mesh`] draws one layer: coverage is gathered
/// per subsample into a mask first, so triangles that overlap inside the
/// same layer never blend twice.
pub struct Canvas {
    width: u32,
    height: u32,
    grid: u32,
    pixels: Vec<[f32; 4]>,
    coverage: Vec<u64>,
}

impl Canvas {
    /// Create a transparent canvas using `sample_count` samples per pixel,
    /// rounded up to a square grid.
    pub fn new(width: u32, height: u32, sample_count: u32) -> Self {
        let grid = ((sample_count.max(1) as f32).sqrt().ceil() as u32).clamp(1, MAX_GRID);
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            grid,
            pixels: vec![[0.0; 4]; len],
            coverage: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Side of the subsample grid.
    pub fn grid(&self) -> u32 {
        self.grid
    }

    /// Straight-alpha color of a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Draw a mesh given in pixel coordinates.
    ///
    /// `color_at` is evaluated at each covered pixel center; the result is
    /// blended source-over with its alpha scaled by `opacity` and the pixel's
    /// coverage.
    pub fn fill_mesh(&mut self, mesh: &Mesh, opacity: f32, color_at: impl Fn(Vec2) -> Color) {
        let Some((min, max)) = self.pixel_span(mesh) else {
            return;
        };

        for triangle in mesh.indices.chunks_exact(3) {
            let v0 = mesh.vertices[triangle[0] as usize];
            let v1 = mesh.vertices[triangle[1] as usize];
            let v2 = mesh.vertices[triangle[2] as usize];
            self.cover_triangle(v0, v1, v2);
        }

        let total = (self.grid * self.grid) as f32;
        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                let idx = (y * self.width + x) as usize;
                let mask = std::mem::take(&mut self.coverage[idx]);
                if mask == 0 {
                    continue;
                }
                let coverage = mask.count_ones() as f32 / total;
                let src = color_at(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let alpha = (src.a * opacity * coverage).clamp(0.0, 1.0);
                blend_over(&mut self.pixels[idx], src, alpha);
            }
        }
    }

    /// Pixel range touched by the mesh, clamped to the canvas.
    fn pixel_span(&self, mesh: &Mesh) -> Option<((u32, u32), (u32, u32))> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (min, max) = mesh.bounds()?;
        if max.x < 0.0 || max.y < 0.0 || min.x >= self.width as f32 || min.y >= self.height as f32 {
            return None;
        }
        let x0 = min.x.max(0.0) as u32;
        let y0 = min.y.max(0.0) as u32;
        let x1 = (max.x.ceil() as u32).min(self.width - 1);
        let y1 = (max.y.ceil() as u32).min(self.height - 1);
        Some(((x0, y0), (x1, y1)))
    }

    /// Mark the subsamples inside a triangle using edge functions.
    fn cover_triangle(&mut self, v0: Vec2, v1: Vec2, v2: Vec2) {
        let area = edge_function(v0, v1, v2);
        if area.abs() < 1e-6 {
            return;
        }

        let min = v0.min(v1).min(v2).max(Vec2::ZERO);
        let max = v0
            .max(v1)
            .max(v2)
            .min(Vec2::new(self.width as f32 - 1.0, self.height as f32 - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }

        let step = 1.0 / self.grid as f32;
        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let mut mask = 0u64;
                for sy in 0..self.grid {
                    for sx in 0..self.grid {
                        let p = Vec2::new(
                            x as f32 + (sx as f32 + 0.5) * step,
                            y as f32 + (sy as f32 + 0.5) * step,
                        );
                        let w0 = edge_function(v1, v2, p);
                        let w1 = edge_function(v2, v0, p);
                        let w2 = edge_function(v0, v1, p);
                        let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                            || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                        if inside {
                            mask |= 1u64 << (sy * self.grid + sx);
                        }
                    }
                }
                self.coverage[(y * self.width + x) as usize] |= mask;
            }
        }
    }

    /// Convert to an 8-bit straight-alpha image.
    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (dst, src) in image.pixels_mut().zip(self.pixels.iter()) {
            let (r, g, b, a) = Color::rgba(src[0], src[1], src[2], src[3]).to_rgba8();
            dst.0 = [r, g, b, a];
        }
        image
    }
}

fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Straight-alpha source-over.
fn blend_over(dst: &mut [f32; 4], src: Color, alpha: f32) {
    let dst_a = dst[3];
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        *dst = [0.0; 4];
        return;
    }
    let mix = |s: f32, d: f32| (s * alpha + d * dst_a * (1.0 - alpha)) / out_a;
    *dst = [
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        out_a,
    ];
}
