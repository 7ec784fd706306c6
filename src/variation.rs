//! On-the-fly variation instancing for paint attributes.
//!
//! Rather than a proxy that intercepts every attribute access, resolution
//! happens once, up front, through [`resolve_paint`] and
//! [`resolve_color_stops`], producing plain [`ResolvedPaint`]/
//! [`crate::color::ResolvedColorStop`] views that the paint-tree interpreter
//! consumes with no further reflection.

use crate::color::{Extend, Rgba};
use crate::paint::{ClipBox, ColorLine, ColorStop, CompositeMode, Paint};
use font_types::{BoundingBox, GlyphId, Point};

/// Sentinel `varIndexBase`/`varIdx` meaning "no variation applies".
pub const NO_VARIATION: u32 = 0xFFFF_FFFF;

/// A decoded item variation store, capable of computing a floating-point
/// delta for a given delta-set index at a normalized variation location.
///
/// Implementations are expected to have already performed the fixed-point
/// (F2Dot14 / Fixed) scaling appropriate to the target attribute, so callers
/// receive deltas directly usable in the attribute's native units.
pub trait ItemVariationStore {
    fn delta(&self, outer: u16, inner: u16, coords: &[f32]) -> f32;
}

/// A `DeltaSetIndexMap`, indirecting a flat variation index to an
/// `(outer, inner)` delta-set index.
pub trait VarIndexMap {
    /// Returns `None` if `var_idx` is out of range of the map; callers then
    /// fall back to treating `var_idx` as the inner component of outer `0`.
    fn get(&self, var_idx: u32) -> Option<(u16, u16)>;
}

/// Binds a variation store and an index map to a normalized axis location.
#[derive(Clone, Copy)]
pub struct Instancer<'a> {
    pub coords: &'a [f32],
    pub var_store: Option<&'a dyn ItemVariationStore>,
    pub index_map: Option<&'a dyn VarIndexMap>,
}

impl<'a> Instancer<'a> {
    /// An instancer with no variation store: every attribute resolves to its
    /// base value.
    pub const STATIC: Instancer<'static> = Instancer {
        coords: &[],
        var_store: None,
        index_map: None,
    };

    fn has_variations(&self) -> bool {
        !self.coords.is_empty() && self.var_store.is_some()
    }

    fn delta_at(&self, var_index_base: u32, field_index: u32) -> f32 {
        if !self.has_variations() || var_index_base == NO_VARIATION {
            return 0.0;
        }
        let var_idx = var_index_base.wrapping_add(field_index);
        let var_store = self
            .var_store
            .expect("has_variations() guarantees var_store is Some");
        let (outer, inner) = match self.index_map {
            Some(map) => map.get(var_idx).unwrap_or((0, var_idx as u16)),
            None => (0, var_idx as u16),
        };
        var_store.delta(outer, inner, self.coords)
    }

    /// Applies deltas `var_index_base + 0 .. var_index_base + N` to `base`,
    /// in declared field order. A `None` base index returns `base` unchanged.
    pub fn apply<const N: usize>(&self, var_index_base: Option<u32>, base: [f32; N]) -> [f32; N] {
        let Some(var_index_base) = var_index_base else {
            return base;
        };
        let mut out = base;
        for (i, value) in out.iter_mut().enumerate() {
            *value += self.delta_at(var_index_base, i as u32);
        }
        out
    }
}

/// A resolved, non-variable view of a [`Paint`] node.
///
/// Child paints of transform/composite nodes are borrowed rather than
/// cloned, since [`Paint`] owns its subtree.
pub enum ResolvedPaint<'a> {
    ColrLayers {
        range: std::ops::Range<u32>,
    },
    Solid {
        palette_index: u16,
        alpha: f32,
    },
    LinearGradient {
        p0: Point<f32>,
        p1: Point<f32>,
        p2: Point<f32>,
        color_stops: Vec<ResolvedStop>,
        extend: Extend,
    },
    RadialGradient {
        c0: Point<f32>,
        r0: f32,
        c1: Point<f32>,
        r1: f32,
        color_stops: Vec<ResolvedStop>,
        extend: Extend,
    },
    SweepGradient {
        center: Point<f32>,
        start_angle: f32,
        end_angle: f32,
        color_stops: Vec<ResolvedStop>,
        extend: Extend,
    },
    Glyph {
        glyph_id: GlyphId,
        paint: &'a Paint,
    },
    ColrGlyph {
        glyph_id: GlyphId,
    },
    Transform {
        affine: crate::geometry::Transform,
        paint: &'a Paint,
    },
    Composite {
        source: &'a Paint,
        mode: CompositeMode,
        backdrop: &'a Paint,
    },
}

/// A color stop with variation deltas applied, but palette index not yet
/// resolved to a color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolvedStop {
    pub offset: f32,
    pub palette_index: u16,
    pub alpha: f32,
}

/// Resolves every stop in a color line, in declared order (not necessarily
/// sorted by offset -- callers normalize separately).
pub fn resolve_color_stops(color_line: &ColorLine, instancer: &Instancer) -> Vec<ResolvedStop> {
    color_line
        .stops
        .iter()
        .map(|stop| resolve_stop(stop, instancer))
        .collect()
}

fn resolve_stop(stop: &ColorStop, instancer: &Instancer) -> ResolvedStop {
    let [offset, alpha] = instancer.apply(stop.var_index_base, [stop.stop_offset, stop.alpha]);
    ResolvedStop {
        offset,
        palette_index: stop.palette_index,
        alpha,
    }
}

/// Resolves a clip box, applying variation deltas if present.
pub fn resolve_clip_box(clip_box: &ClipBox, instancer: &Instancer) -> BoundingBox<f32> {
    let [x_min, y_min, x_max, y_max] = instancer.apply(
        clip_box.var_index_base,
        [clip_box.x_min, clip_box.y_min, clip_box.x_max, clip_box.y_max],
    );
    BoundingBox {
        x_min,
        y_min,
        x_max,
        y_max,
    }
}

/// Resolves a [`Paint`] node's own attributes (not its color stops or
/// children's attributes -- those resolve independently as the interpreter
/// descends).
pub fn resolve_paint<'a>(paint: &'a Paint, instancer: &Instancer) -> ResolvedPaint<'a> {
    match paint {
        Paint::ColrLayers {
            first_layer_index,
            num_layers,
        } => ResolvedPaint::ColrLayers {
            range: *first_layer_index..(*first_layer_index + *num_layers),
        },
        Paint::Solid {
            palette_index,
            alpha,
            var_index_base,
        } => {
            let [alpha] = instancer.apply(*var_index_base, [*alpha]);
            ResolvedPaint::Solid {
                palette_index: *palette_index,
                alpha,
            }
        }
        Paint::LinearGradient(g) => {
            let [x0, y0, x1, y1, x2, y2] = instancer.apply(
                g.var_index_base,
                [g.p0.x, g.p0.y, g.p1.x, g.p1.y, g.p2.x, g.p2.y],
            );
            ResolvedPaint::LinearGradient {
                p0: Point::new(x0, y0),
                p1: Point::new(x1, y1),
                p2: Point::new(x2, y2),
                color_stops: resolve_color_stops(&g.color_line, instancer),
                extend: g.color_line.extend,
            }
        }
        Paint::RadialGradient(g) => {
            let [x0, y0, r0, x1, y1, r1] = instancer.apply(
                g.var_index_base,
                [g.c0.x, g.c0.y, g.r0, g.c1.x, g.c1.y, g.r1],
            );
            ResolvedPaint::RadialGradient {
                c0: Point::new(x0, y0),
                r0,
                c1: Point::new(x1, y1),
                r1,
                color_stops: resolve_color_stops(&g.color_line, instancer),
                extend: g.color_line.extend,
            }
        }
        Paint::SweepGradient(g) => {
            let [cx, cy, start_angle, end_angle] = instancer.apply(
                g.var_index_base,
                [g.center.x, g.center.y, g.start_angle, g.end_angle],
            );
            ResolvedPaint::SweepGradient {
                center: Point::new(cx, cy),
                start_angle,
                end_angle,
                color_stops: resolve_color_stops(&g.color_line, instancer),
                extend: g.color_line.extend,
            }
        }
        Paint::Glyph { glyph_id, paint } => ResolvedPaint::Glyph {
            glyph_id: *glyph_id,
            paint,
        },
        Paint::ColrGlyph { glyph_id } => ResolvedPaint::ColrGlyph {
            glyph_id: *glyph_id,
        },
        Paint::Transform(affine, child) => {
            let [xx, yx, xy, yy, dx, dy] = instancer.apply(
                affine.var_index_base,
                [affine.xx, affine.yx, affine.xy, affine.yy, affine.dx, affine.dy],
            );
            ResolvedPaint::Transform {
                affine: crate::geometry::Transform { xx, yx, xy, yy, dx, dy },
                paint: child,
            }
        }
        Paint::Translate(t) => {
            let [dx, dy] = instancer.apply(t.var_index_base, [t.dx, t.dy]);
            ResolvedPaint::Transform {
                affine: crate::geometry::Transform::translation(dx, dy),
                paint: &t.paint,
            }
        }
        Paint::Rotate(r) => {
            let (angle, center) = resolve_around_center(instancer, r.var_index_base, r.angle, r.around_center, 1);
            ResolvedPaint::Transform {
                affine: crate::geometry::Transform::rotation(angle, center),
                paint: &r.paint,
            }
        }
        Paint::Scale(s) => {
            let (values, center) = resolve_scale_values(instancer, s);
            ResolvedPaint::Transform {
                affine: crate::geometry::Transform::scale_around_center(values[0], values[1], center),
                paint: &s.paint,
            }
        }
        Paint::Skew(s) => {
            let base2 = [s.x_skew_angle, s.y_skew_angle];
            let (angles, center) = resolve_around_center_n(instancer, s.var_index_base, base2, s.around_center);
            ResolvedPaint::Transform {
                affine: crate::geometry::Transform::skew(angles[0], angles[1], center),
                paint: &s.paint,
            }
        }
        Paint::Composite {
            source,
            mode,
            backdrop,
        } => ResolvedPaint::Composite {
            source,
            mode: *mode,
            backdrop,
        },
    }
}

fn resolve_around_center(
    instancer: &Instancer,
    var_index_base: Option<u32>,
    angle: f32,
    around_center: Option<Point<f32>>,
    _angle_count: usize,
) -> (f32, Option<Point<f32>>) {
    match around_center {
        None => {
            let [angle] = instancer.apply(var_index_base, [angle]);
            (angle, None)
        }
        Some(center) => {
            let [angle, cx, cy] = instancer.apply(var_index_base, [angle, center.x, center.y]);
            (angle, Some(Point::new(cx, cy)))
        }
    }
}

fn resolve_around_center_n(
    instancer: &Instancer,
    var_index_base: Option<u32>,
    base: [f32; 2],
    around_center: Option<Point<f32>>,
) -> ([f32; 2], Option<Point<f32>>) {
    match around_center {
        None => (instancer.apply(var_index_base, base), None),
        Some(center) => {
            let [a0, a1, cx, cy] =
                instancer.apply(var_index_base, [base[0], base[1], center.x, center.y]);
            ([a0, a1], Some(Point::new(cx, cy)))
        }
    }
}

fn resolve_scale_values(
    instancer: &Instancer,
    s: &crate::paint::ScalePaint,
) -> ([f32; 2], Option<Point<f32>>) {
    resolve_around_center_n(
        instancer,
        s.var_index_base,
        [s.scale_x, s.scale_y],
        s.around_center,
    )
}

/// Resolves a palette index + alpha multiplier against the current palette,
/// falling back to `text_color` for the sentinel index, an unselected
/// palette, or an out-of-range index -- the `OutOfRangePaletteIndex`
/// recovery policy.
pub fn resolve_color(palette: Option<&[Rgba]>, index: u16, alpha_mul: f32, text_color: Rgba) -> Rgba {
    const FOREGROUND_COLOR_INDEX: u16 = 0xFFFF;
    let base = if index == FOREGROUND_COLOR_INDEX {
        text_color
    } else {
        match palette.and_then(|p| p.get(index as usize)) {
            Some(color) => *color,
            None => text_color,
        }
    };
    Rgba {
        a: base.a * alpha_mul,
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstStore(f32);
    impl ItemVariationStore for ConstStore {
        fn delta(&self, _outer: u16, _inner: u16, _coords: &[f32]) -> f32 {
            self.0
        }
    }

    #[test]
    fn no_variation_base_is_passthrough() {
        let instancer = Instancer::STATIC;
        assert_eq!(instancer.apply(Some(3), [1.0, 2.0]), [1.0, 2.0]);
        assert_eq!(instancer.apply(None, [1.0, 2.0]), [1.0, 2.0]);
    }

    #[test]
    fn sentinel_var_index_base_is_passthrough() {
        let store = ConstStore(5.0);
        let coords = [0.5f32];
        let instancer = Instancer {
            coords: &coords,
            var_store: Some(&store),
            index_map: None,
        };
        assert_eq!(instancer.apply(Some(NO_VARIATION), [1.0]), [1.0]);
    }

    #[test]
    fn applies_delta_per_field_in_order() {
        let store = ConstStore(10.0);
        let coords = [0.5f32];
        let instancer = Instancer {
            coords: &coords,
            var_store: Some(&store),
            index_map: None,
        };
        assert_eq!(instancer.apply(Some(0), [1.0, 2.0, 3.0]), [11.0, 12.0, 13.0]);
    }

    #[test]
    fn out_of_range_index_map_falls_back_to_raw_index() {
        struct EmptyMap;
        impl VarIndexMap for EmptyMap {
            fn get(&self, _var_idx: u32) -> Option<(u16, u16)> {
                None
            }
        }
        let store = ConstStore(1.0);
        let map = EmptyMap;
        let coords = [0.1f32];
        let instancer = Instancer {
            coords: &coords,
            var_store: Some(&store),
            index_map: Some(&map),
        };
        assert_eq!(instancer.apply(Some(7), [0.0]), [1.0]);
    }

    #[test]
    fn resolve_color_uses_text_color_for_foreground_sentinel() {
        let palette = [Rgba::new(1.0, 0.0, 0.0, 1.0)];
        let text_color = Rgba::new(0.0, 0.0, 0.0, 1.0);
        let resolved = resolve_color(Some(&palette), 0xFFFF, 1.0, text_color);
        assert_eq!(resolved, text_color);
    }

    #[test]
    fn resolve_color_clamps_out_of_range_index_to_text_color() {
        let palette = [Rgba::new(1.0, 0.0, 0.0, 1.0)];
        let text_color = Rgba::new(0.2, 0.2, 0.2, 1.0);
        let resolved = resolve_color(Some(&palette), 9, 1.0, text_color);
        assert_eq!(resolved, text_color);
    }

    #[test]
    fn resolve_color_applies_alpha_multiplier() {
        let palette = [Rgba::new(1.0, 0.0, 0.0, 1.0)];
        let resolved = resolve_color(Some(&palette), 0, 0.5, Rgba::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(resolved.a, 0.5);
    }
}
