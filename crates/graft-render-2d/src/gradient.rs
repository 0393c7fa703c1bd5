//! Paint evaluation: solid colors and linear/radial gradients.

use glam::Vec2;
use graft_core::{Color, Gradient, GradientStop, Paint, PaintKind};

/// Angle in degrees of the gradient's direction against the positive x axis.
///
/// The direction is the normalized vector from the first to the second
/// handle. The result is signed in (-180, 180]: positive angles turn
/// towards +y (downwards) so the sampler can rebuild the direction from it.
/// Fewer than two handles, or coincident handles, give 0.
///
/// See [`gradient_axis_angle`] for the unsigned angle.
pub fn gradient_angle(handles: &[Vec2]) -> f32 {
    match handles {
        [start, end, ..] => {
            let dir = (*end - *start).normalize_or_zero();
            if dir == Vec2::ZERO {
                0.0
            } else {
                dir.y.atan2(dir.x).to_degrees()
            }
        }
        _ => 0.0,
    }
}

/// Unsigned angle in degrees between the gradient direction and the
/// positive x axis, in [0, 180]. Mirrored directions give the same value.
pub fn gradient_axis_angle(handles: &[Vec2]) -> f32 {
    gradient_angle(handles).abs()
}

/// Sample gradient stops at position t (0.0 to 1.0).
///
/// Stops must be sorted by position.
pub fn sample_gradient_stops(stops: &[GradientStop], t: f32) -> Color {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Color::WHITE,
    };
    let t = t.clamp(0.0, 1.0);
    if t <= first.position {
        return first.color;
    }

    let mut prev = first;
    for stop in stops {
        if stop.position >= t {
            if stop.position == prev.position {
                return stop.color;
            }
            let local_t = (t - prev.position) / (stop.position - prev.position);
            return lerp_color(prev.color, stop.color, local_t);
        }
        prev = stop;
    }
    last.color
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::rgba(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

fn sorted_stops(gradient: &Gradient) -> Vec<GradientStop> {
    let mut stops = gradient.stops.clone();
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
    stops
}

/// A paint resolved into something that can be evaluated per pixel.
///
/// Points are in the node's normalized box space: (0, 0) top-left, (1, 1)
/// bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintSampler {
    Solid(Color),
    Linear {
        start: Vec2,
        /// Unit direction at [`gradient_angle`]
        direction: Vec2,
        length: f32,
        stops: Vec<GradientStop>,
        opacity: f32,
    },
    Radial {
        center: Vec2,
        axis_a: Vec2,
        axis_b: Vec2,
        stops: Vec<GradientStop>,
        opacity: f32,
    },
}

impl PaintSampler {
    /// Resolve a paint. Image paints cannot be sampled and give `None`.
    pub fn from_paint(paint: &Paint) -> Option<Self> {
        match &paint.kind {
            PaintKind::Solid(color) => Some(PaintSampler::Solid(color.with_opacity(paint.opacity))),
            PaintKind::LinearGradient(gradient) => {
                let (start, end) = match gradient.handle_positions.as_slice() {
                    [start, end, ..] => (*start, *end),
                    _ => (Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5)),
                };
                let angle = gradient_angle(&[start, end]).to_radians();
                Some(PaintSampler::Linear {
                    start,
                    direction: Vec2::new(angle.cos(), angle.sin()),
                    length: start.distance(end),
                    stops: sorted_stops(gradient),
                    opacity: paint.opacity,
                })
            }
            PaintKind::RadialGradient(gradient) => {
                let (center, axis_a, axis_b) = match gradient.handle_positions.as_slice() {
                    [center, a, b, ..] => (*center, *a - *center, *b - *center),
                    [center, a] => {
                        let axis = *a - *center;
                        (*center, axis, axis.perp())
                    }
                    _ => (Vec2::splat(0.5), Vec2::new(0.5, 0.0), Vec2::new(0.0, 0.5)),
                };
                Some(PaintSampler::Radial {
                    center,
                    axis_a,
                    axis_b,
                    stops: sorted_stops(gradient),
                    opacity: paint.opacity,
                })
            }
            PaintKind::Image { .. } => None,
        }
    }

    /// Color at a normalized point, paint opacity applied.
    pub fn color_at(&self, p: Vec2) -> Color {
        match self {
            PaintSampler::Solid(color) => *color,
            PaintSampler::Linear {
                start,
                direction,
                length,
                stops,
                opacity,
            } => {
                let t = if *length < 1e-4 {
                    0.0
                } else {
                    (p - *start).dot(*direction) / length
                };
                sample_gradient_stops(stops, t).with_opacity(*opacity)
            }
            PaintSampler::Radial {
                center,
                axis_a,
                axis_b,
                stops,
                opacity,
            } => {
                let d = p - *center;
                let la = axis_a.length_squared();
                let lb = axis_b.length_squared();
                let t = if la < 1e-8 || lb < 1e-8 {
                    0.0
                } else {
                    let u = d.dot(*axis_a) / la;
                    let v = d.dot(*axis_b) / lb;
                    (u * u + v * v).sqrt()
                };
                sample_gradient_stops(stops, t).with_opacity(*opacity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white() -> Gradient {
        Gradient::between(Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5))
            .add_stop(0.0, Color::BLACK)
            .add_stop(1.0, Color::WHITE)
    }

    #[test]
    fn test_gradient_angle() {
        assert_eq!(gradient_angle(&[Vec2::ZERO, Vec2::new(3.0, 0.0)]), 0.0);
        assert!((gradient_angle(&[Vec2::ZERO, Vec2::new(0.0, 2.0)]) - 90.0).abs() < 0.001);
        assert!((gradient_angle(&[Vec2::ZERO, Vec2::new(1.0, 1.0)]) - 45.0).abs() < 0.001);
        assert!((gradient_angle(&[Vec2::ONE, Vec2::ZERO]).abs() - 135.0).abs() < 0.001);
        assert_eq!(gradient_angle(&[Vec2::ONE, Vec2::ONE]), 0.0);
        assert_eq!(gradient_angle(&[Vec2::ONE]), 0.0);
    }

    #[test]
    fn test_axis_angle_is_unsigned() {
        let up = [Vec2::ZERO, Vec2::new(0.0, -2.0)];
        assert!((gradient_angle(&up) + 90.0).abs() < 0.001);
        assert!((gradient_axis_angle(&up) - 90.0).abs() < 0.001);

        let back = [Vec2::ZERO, Vec2::new(-1.0, -1.0)];
        assert!((gradient_axis_angle(&back) - 135.0).abs() < 0.001);
        assert_eq!(gradient_axis_angle(&[Vec2::ZERO, Vec2::X]), 0.0);
    }

    #[test]
    fn test_sample_stops() {
        let stops = sorted_stops(&black_to_white());
        assert_eq!(sample_gradient_stops(&stops, -1.0), Color::BLACK);
        assert_eq!(sample_gradient_stops(&stops, 2.0), Color::WHITE);
        let mid = sample_gradient_stops(&stops, 0.5);
        assert!((mid.r - 0.5).abs() < 0.001);
        assert_eq!(sample_gradient_stops(&[], 0.3), Color::WHITE);
    }

    #[test]
    fn test_unsorted_stops_are_sorted() {
        let gradient = Gradient::default()
            .add_stop(1.0, Color::WHITE)
            .add_stop(0.0, Color::BLACK);
        let sampler = PaintSampler::from_paint(&Paint::linear(gradient)).unwrap();
        assert_eq!(sampler.color_at(Vec2::new(0.0, 0.5)), Color::BLACK);
    }

    #[test]
    fn test_linear_sampler_projects_on_handles() {
        let sampler = PaintSampler::from_paint(&Paint::linear(black_to_white())).unwrap();
        let left = sampler.color_at(Vec2::new(0.0, 0.1));
        let right = sampler.color_at(Vec2::new(1.0, 0.9));
        let quarter = sampler.color_at(Vec2::new(0.25, 0.7));
        assert_eq!(left, Color::BLACK);
        assert_eq!(right, Color::WHITE);
        assert!((quarter.g - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_radial_sampler() {
        let gradient = Gradient {
            handle_positions: vec![Vec2::splat(0.5), Vec2::new(1.0, 0.5), Vec2::new(0.5, 1.0)],
            stops: Vec::new(),
        }
        .add_stop(0.0, Color::WHITE)
        .add_stop(1.0, Color::BLACK);
        let sampler = PaintSampler::from_paint(&Paint::radial(gradient).with_opacity(0.5)).unwrap();
        let center = sampler.color_at(Vec2::splat(0.5));
        let edge = sampler.color_at(Vec2::new(0.5, 0.0));
        assert_eq!(center, Color::rgba(1.0, 1.0, 1.0, 0.5));
        assert_eq!(edge, Color::rgba(0.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_image_paint_is_not_sampled() {
        assert!(PaintSampler::from_paint(&Paint::image("abc")).is_none());
    }
}
