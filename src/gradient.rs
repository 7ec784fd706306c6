//! Color-line normalization and gradient-geometry repositioning.
//!
//! A `ColorLine`'s stop offsets are not required to span `[0, 1]`, or even to
//! be sorted; the geometry a gradient paint carries (its anchor points,
//! radii, or start/end angle) is defined against the stops' *original*
//! domain. Before a brush can be handed to a [`crate::canvas::Canvas`], the
//! stops are rescaled to `[0, 1]` and the geometry is pulled in to match.

use crate::color::{Extend, Rgba, ResolvedColorStop};
use crate::palette::Palette;
use crate::variation::ResolvedStop;
use font_types::Point;

const EPSILON: f32 = 1e-6;

/// A color line rescaled so its stops span `[0, 1]`, plus the `(min, max)`
/// original offsets a gradient's geometry should be repositioned against.
pub struct NormalizedColorLine {
    pub stops: Vec<ResolvedColorStop>,
    pub min_stop: f32,
    pub max_stop: f32,
}

/// Resolves palette indices to colors and rescales stop offsets to `[0, 1]`.
///
/// Returns `None` if fewer than two stops are present -- callers should
/// treat that as a degenerate gradient and fall back to a solid fill.
pub fn normalize_color_line(
    stops: &[ResolvedStop],
    extend: Extend,
    palette: Option<&Palette>,
    text_color: Rgba,
) -> Option<NormalizedColorLine> {
    if stops.len() < 2 {
        return None;
    }

    let min_stop = stops.iter().fold(f32::INFINITY, |acc, s| acc.min(s.offset));
    let max_stop = stops.iter().fold(f32::NEG_INFINITY, |acc, s| acc.max(s.offset));

    let resolve = |s: &ResolvedStop| -> Rgba {
        match palette {
            Some(p) => p.resolve(s.palette_index, s.alpha, text_color),
            None => Rgba { a: s.alpha, ..text_color },
        }
    };

    let mut resolved: Vec<ResolvedColorStop> = if (max_stop - min_stop).abs() < EPSILON {
        // All stops coincide: normalization would divide by zero, so this is
        // left as a no-op -- the stops keep their (identical) raw offset and
        // the gradient geometry below is not repositioned either.
        stops
            .iter()
            .map(|s| ResolvedColorStop {
                offset: s.offset,
                color: resolve(s),
            })
            .collect()
    } else {
        stops
            .iter()
            .map(|s| ResolvedColorStop {
                offset: (s.offset - min_stop) / (max_stop - min_stop),
                color: resolve(s),
            })
            .collect()
    };

    ensure_distinct_domain(&mut resolved, extend);

    let (min_stop, max_stop) = if (max_stop - min_stop).abs() < EPSILON {
        (0.0, 1.0)
    } else {
        (min_stop, max_stop)
    };

    Some(NormalizedColorLine {
        stops: resolved,
        min_stop,
        max_stop,
    })
}

/// If every stop landed on the same offset after normalization, a native
/// gradient API that requires at least two distinct offsets would refuse the
/// brush outright. Insert a duplicate stop at the opposite end of `[0, 1]`
/// matching the extend-mode's natural behavior there, so the gradient still
/// renders as the intended solid color.
fn ensure_distinct_domain(stops: &mut Vec<ResolvedColorStop>, extend: Extend) {
    let first_offset = stops[0].offset;
    if stops.iter().any(|s| (s.offset - first_offset).abs() > EPSILON) {
        return;
    }
    if extend != Extend::Pad {
        return;
    }
    let color = stops.last().unwrap().color;
    if first_offset < 1.0 - EPSILON {
        stops.push(ResolvedColorStop { offset: 1.0, color });
    } else if first_offset > EPSILON {
        stops.insert(0, ResolvedColorStop { offset: 0.0, color });
    }
}

fn lerp_point(a: Point<f32>, b: Point<f32>, t: f32) -> Point<f32> {
    Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
}

fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Repositions a linear gradient's two anchor points to the `[min, max]`
/// stop domain.
pub fn reposition_linear(p0: Point<f32>, p1: Point<f32>, min_stop: f32, max_stop: f32) -> (Point<f32>, Point<f32>) {
    (lerp_point(p0, p1, min_stop), lerp_point(p0, p1, max_stop))
}

/// Repositions a radial gradient's two circles to the `[min, max]` stop
/// domain.
pub fn reposition_radial(
    c0: Point<f32>,
    r0: f32,
    c1: Point<f32>,
    r1: f32,
    min_stop: f32,
    max_stop: f32,
) -> (Point<f32>, f32, Point<f32>, f32) {
    (
        lerp_point(c0, c1, min_stop),
        lerp_f32(r0, r1, min_stop),
        lerp_point(c0, c1, max_stop),
        lerp_f32(r0, r1, max_stop),
    )
}

/// Repositions a sweep gradient's angular span to the `[min, max]` stop
/// domain.
pub fn reposition_sweep(start_angle: f32, end_angle: f32, min_stop: f32, max_stop: f32) -> (f32, f32) {
    (
        lerp_f32(start_angle, end_angle, min_stop),
        lerp_f32(start_angle, end_angle, max_stop),
    )
}

fn dot(a: Point<f32>, b: Point<f32>) -> f32 {
    a.x * b.x + a.y * b.y
}

fn sub(a: Point<f32>, b: Point<f32>) -> Point<f32> {
    Point::new(a.x - b.x, a.y - b.y)
}

/// Reduces a COLRv1 linear gradient's three anchor points (`p0` the start,
/// `p1` the end, `p2` the point establishing the gradient's rotation axis)
/// to the two-point `(p0, p3)` form a conventional linear-gradient brush
/// uses: `v = p2 - p0`, `u = p1 - p0`, `p3 = p1 - ((u . v) / |v|^2) * v`,
/// i.e. `p1` with its component along `v` projected away, leaving only the
/// component perpendicular to `v`.
///
/// Returns `None` if `p2 == p0`, leaving the rotation axis undefined;
/// callers should fall back to the unrotated `(p0, p1)` gradient and log a
/// warning.
pub fn reduce_three_anchors_to_two(p0: Point<f32>, p1: Point<f32>, p2: Point<f32>) -> Option<Point<f32>> {
    let v = sub(p2, p0);
    let len_sq = dot(v, v);
    if len_sq < EPSILON {
        return None;
    }
    let u = sub(p1, p0);
    let scale = dot(u, v) / len_sq;
    Some(Point::new(p1.x - v.x * scale, p1.y - v.y * scale))
}
