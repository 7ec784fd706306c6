//! Triangle-fan and mesh-patch approximation of a sweep (conic) gradient.
//!
//! Most 2D vector backends have no native conic-gradient primitive. This
//! module subdivides the annular wedge a `SweepGradient` paint covers into
//! either Gouraud-shaded triangles (for backends that can fill a triangle
//! with per-vertex colors, e.g. a mesh/triangle-fan API) or cubic-Bezier mesh
//! patches (for backends with a coons/tensor patch primitive, e.g. Skia's
//! `drawPatch`), each of them small enough that linear (Gouraud) or bilinear
//! (patch) interpolation across it is visually indistinguishable from the
//! true conic gradient.

use crate::color::{Rgba, ResolvedColorStop};
use font_types::Point;
use std::f32::consts::PI;

/// Smallest wedge angle ever used, for either shading mode.
const MIN_MAX_ANGLE: f32 = PI / 360.0;
/// Largest wedge angle ever used, for either shading mode.
const MAX_MAX_ANGLE: f32 = PI / 2.0;
/// Default wedge angle for Gouraud-shaded triangle fans.
const DEFAULT_GOURAUD_MAX_ANGLE: f32 = PI / 360.0;
/// Default wedge angle for cubic-Bezier mesh patches.
const DEFAULT_MESH_MAX_ANGLE: f32 = PI / 8.0;

/// A single piece of the gradient's annular approximation, expressed however
/// the target 2D backend expects it.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    /// A flat-bottomed triangle `center, p0, p1`, to be filled with
    /// per-vertex colors `color_center, color0, color1` (Gouraud shading).
    GouraudTriangle {
        center: Point<f32>,
        color_center: Rgba,
        p0: Point<f32>,
        color0: Rgba,
        p1: Point<f32>,
        color1: Rgba,
    },
    /// A triangular "mesh" patch: a flat vertex at `center` and a cubic-
    /// Bezier outer edge from `p0` to `p1` via `control0`/`control1`
    /// approximating the circular arc between them.
    MeshPatch {
        center: Point<f32>,
        color_center: Rgba,
        p0: Point<f32>,
        color0: Rgba,
        control0: Point<f32>,
        control1: Point<f32>,
        p1: Point<f32>,
        color1: Rgba,
    },
}

fn point_on_unit_circle(angle: f32) -> Point<f32> {
    Point::new(angle.cos(), angle.sin())
}

fn add(a: Point<f32>, b: Point<f32>) -> Point<f32> {
    Point::new(a.x + b.x, a.y + b.y)
}

fn sub(a: Point<f32>, b: Point<f32>) -> Point<f32> {
    Point::new(a.x - b.x, a.y - b.y)
}

fn scale(a: Point<f32>, s: f32) -> Point<f32> {
    Point::new(a.x * s, a.y * s)
}

fn dot(a: Point<f32>, b: Point<f32>) -> f32 {
    a.x * b.x + a.y * b.y
}

fn normalized(a: Point<f32>) -> Point<f32> {
    let len = (a.x * a.x + a.y * a.y).sqrt().max(f32::EPSILON);
    scale(a, 1.0 / len)
}

/// Two-tangent cubic-Bezier control points approximating the unit-circle arc
/// from `p0` to `p1` (both on the unit circle): the bisector `A` of `p0+p1`
/// and its perpendicular tangent `U` give the intersections `C0`/`C1` of the
/// tangent lines at `p0`/`p1` with that tangent line, each then shifted
/// outward by a third of `Ci - pi`.
fn arc_control_points(p0: Point<f32>, p1: Point<f32>) -> (Point<f32>, Point<f32>) {
    let a = normalized(add(p0, p1));
    let u = Point::new(-a.y, a.x);
    let c0 = add(a, scale(u, dot(sub(p0, a), p0) / dot(u, p0)));
    let c1 = add(a, scale(u, dot(sub(p1, a), p1) / dot(u, p1)));
    let c0 = add(c0, scale(sub(c0, p0), 1.0 / 3.0));
    let c1 = add(c1, scale(sub(c1, p1), 1.0 / 3.0));
    (c0, c1)
}

fn clamp_max_angle(max_angle: Option<f32>, default: f32) -> f32 {
    max_angle.unwrap_or(default).clamp(MIN_MAX_ANGLE, MAX_MAX_ANGLE)
}

/// Builds the patch list for a sweep gradient wedge from `start_angle` to
/// `end_angle` (radians, `end_angle > start_angle`), with `color_stops`
/// already normalized to `[0, 1]` offsets spanning that wedge.
///
/// Callers working with the canvas contract's degrees-based angles (as a
/// [`crate::canvas::Brush::SweepGradient`] carries) convert with
/// `to_radians()` first.
///
/// `max_angle` overrides the default per-patch subdivision angle; `None`
/// picks the mode's default before clamping to `[PI/360, PI/2]`.
pub fn build_patches(
    center: Point<f32>,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    color_stops: &[ResolvedColorStop],
    use_gouraud_shading: bool,
    max_angle: Option<f32>,
) -> Vec<Patch> {
    if color_stops.len() < 2 || radius <= 0.0 || end_angle <= start_angle {
        return Vec::new();
    }

    let max_angle = clamp_max_angle(
        max_angle,
        if use_gouraud_shading {
            DEFAULT_GOURAUD_MAX_ANGLE
        } else {
            DEFAULT_MESH_MAX_ANGLE
        },
    );

    // Gouraud triangles approximate the arc with chords, so inflate the
    // radius to keep the chord's midpoint from dipping inside the true
    // circle by more than a fraction of a pixel at typical glyph sizes.
    let patch_radius = if use_gouraud_shading {
        radius / (max_angle / 2.0).cos()
    } else {
        radius
    };

    let span = end_angle - start_angle;
    let mut patches = Vec::new();

    for window in color_stops.windows(2) {
        let [from, to] = [window[0], window[1]];
        if to.offset <= from.offset {
            continue;
        }
        let wedge_start = start_angle + from.offset * span;
        let wedge_end = start_angle + to.offset * span;
        let wedge_span = wedge_end - wedge_start;
        let num_substeps = (wedge_span / max_angle).ceil().max(1.0) as u32;
        let substep_angle = wedge_span / num_substeps as f32;

        for i in 0..num_substeps {
            let t0 = i as f32 / num_substeps as f32;
            let t1 = (i + 1) as f32 / num_substeps as f32;
            let angle0 = wedge_start + substep_angle * i as f32;
            let angle1 = wedge_start + substep_angle * (i + 1) as f32;
            let color0 = from.color.lerp(to.color, t0);
            let color1 = from.color.lerp(to.color, t1);
            let unit0 = point_on_unit_circle(angle0);
            let unit1 = point_on_unit_circle(angle1);
            let p0 = add(center, scale(unit0, patch_radius));
            let p1 = add(center, scale(unit1, patch_radius));

            if use_gouraud_shading {
                patches.push(Patch::GouraudTriangle {
                    center,
                    color_center: color0,
                    p0,
                    color0,
                    p1,
                    color1,
                });
            } else {
                let (c0, c1) = arc_control_points(unit0, unit1);
                patches.push(Patch::MeshPatch {
                    center,
                    color_center: color0,
                    p0,
                    color0,
                    control0: add(center, scale(c0, patch_radius)),
                    control1: add(center, scale(c1, patch_radius)),
                    p1,
                    color1,
                });
            }
        }
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> Vec<ResolvedColorStop> {
        vec![
            ResolvedColorStop {
                offset: 0.0,
                color: Rgba::new(1.0, 0.0, 0.0, 1.0),
            },
            ResolvedColorStop {
                offset: 1.0,
                color: Rgba::new(0.0, 0.0, 1.0, 1.0),
            },
        ]
    }

    #[test]
    fn full_circle_produces_patches() {
        let patches = build_patches(
            Point::new(0.0, 0.0),
            10.0,
            0.0,
            2.0 * PI,
            &stops(),
            true,
            None,
        );
        assert!(!patches.is_empty());
    }

    #[test]
    fn degenerate_radius_produces_no_patches() {
        let patches = build_patches(Point::new(0.0, 0.0), 0.0, 0.0, PI, &stops(), true, None);
        assert!(patches.is_empty());
    }

    #[test]
    fn single_stop_produces_no_patches() {
        let single = vec![stops()[0]];
        let patches = build_patches(Point::new(0.0, 0.0), 10.0, 0.0, PI, &single, true, None);
        assert!(patches.is_empty());
    }

    #[test]
    fn gouraud_inflates_radius_beyond_mesh() {
        let gouraud = build_patches(Point::new(0.0, 0.0), 10.0, 0.0, PI / 4.0, &stops(), true, Some(PI / 8.0));
        let mesh = build_patches(Point::new(0.0, 0.0), 10.0, 0.0, PI / 4.0, &stops(), false, Some(PI / 8.0));
        let Patch::GouraudTriangle { p0, .. } = &gouraud[0] else {
            panic!("expected gouraud triangle")
        };
        let Patch::MeshPatch { p0: mesh_p0, .. } = &mesh[0] else {
            panic!("expected mesh patch")
        };
        let gouraud_radius = (p0.x * p0.x + p0.y * p0.y).sqrt();
        let mesh_radius = (mesh_p0.x * mesh_p0.x + mesh_p0.y * mesh_p0.y).sqrt();
        assert!(gouraud_radius > mesh_radius);
    }

    #[test]
    fn max_angle_is_clamped_to_floor() {
        let patches = build_patches(Point::new(0.0, 0.0), 10.0, 0.0, PI / 4.0, &stops(), true, Some(0.0));
        // clamped to MIN_MAX_ANGLE, so still produces a bounded, nonzero patch count
        assert!(!patches.is_empty());
    }
}
