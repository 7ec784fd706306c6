//! The paint-tree interpreter: walks a COLRv1 paint graph (or a COLRv0
//! layer list, or a single plain outline) and drives a [`Canvas`].
//!
//! Traversal carries a depth guard, a base-glyph cycle check, and a per-
//! variant dispatch; each paint kind that pushes canvas state (clip,
//! transform, layer) does so through one of [`crate::canvas`]'s RAII guards,
//! so the scoping nests and unwinds correctly around every recursive call.

use std::collections::HashSet;

use font_types::{BoundingBox, GlyphId};
use log::warn;

use crate::canvas::{Brush, Canvas, ClipGuard, LayerGuard, TransformGuard};
use crate::color::Rgba;
use crate::error::{PaintError, MAX_TRAVERSAL_DEPTH};
use crate::geometry::Transform;
use crate::gradient;
use crate::palette::Palette;
use crate::paint::Paint;
use crate::source::{GlyphSource, V0Layer};
use crate::variation::{resolve_clip_box, resolve_paint, Instancer, ResolvedPaint};

/// The union of two bounding boxes; empty (zero-area at the origin) boxes
/// are treated as "no contribution yet" so a fold starting from one still
/// produces the other operand's extent.
fn union_bounds(a: BoundingBox<f32>, b: BoundingBox<f32>) -> BoundingBox<f32> {
    BoundingBox {
        x_min: a.x_min.min(b.x_min),
        y_min: a.y_min.min(b.y_min),
        x_max: a.x_max.max(b.x_max),
        y_max: a.y_max.max(b.y_max),
    }
}

/// Drives a [`Canvas`] by interpreting one font's color glyph data.
///
/// An `Interpreter` is cheap to construct and is typically built fresh per
/// render call (it owns only the variation location, the selected palette,
/// and the current text color); the font data it reads through `source`
/// outlives it.
pub struct Interpreter<'a, S: GlyphSource> {
    source: &'a S,
    instancer: Instancer<'a>,
    palette: Option<Palette>,
    text_color: Rgba,
    visited: HashSet<GlyphId>,
    depth: u32,
}

impl<'a, S: GlyphSource> Interpreter<'a, S> {
    pub fn new(source: &'a S, instancer: Instancer<'a>, palette: Option<Palette>, text_color: Rgba) -> Self {
        Self {
            source,
            instancer,
            palette,
            text_color,
            visited: HashSet::new(),
            depth: 0,
        }
    }

    /// Draws `glyph_id`: COLRv1 if it has a paint graph, else COLRv0 if it
    /// has a simple layer list, else the plain (uncolored) glyph outline
    /// filled with the current text color.
    pub fn draw_glyph(&mut self, glyph_id: GlyphId, canvas: &mut impl Canvas) -> Result<(), PaintError> {
        self.visited.clear();
        self.depth = 0;

        if let Some(paint) = self.source.v1_base_paint(glyph_id) {
            self.visited.insert(glyph_id);
            self.draw_v1_root(glyph_id, paint, canvas)
        } else if let Some(layers) = self.source.v0_layers(glyph_id) {
            self.draw_v0(&layers, canvas);
            Ok(())
        } else {
            self.draw_uncolored(glyph_id, canvas);
            Ok(())
        }
    }

    fn draw_v1_root(&mut self, glyph_id: GlyphId, paint: &Paint, canvas: &mut impl Canvas) -> Result<(), PaintError> {
        match self.source.v1_clip_box(glyph_id) {
            Some(clip_box) => {
                let clip_box = resolve_clip_box(&clip_box, &self.instancer);
                let mut guard = ClipGuard::rect(canvas, clip_box);
                self.traverse(paint, guard.canvas())
            }
            None => self.traverse(paint, canvas),
        }
    }

    fn draw_v0(&mut self, layers: &[V0Layer], canvas: &mut impl Canvas) {
        for layer in layers {
            let color = self.resolve_color(layer.palette_index, 1.0);
            canvas.fill_glyph(layer.glyph_id, Transform::IDENTITY, &Brush::Solid(color));
        }
    }

    fn draw_uncolored(&mut self, glyph_id: GlyphId, canvas: &mut impl Canvas) {
        canvas.fill_glyph(glyph_id, Transform::IDENTITY, &Brush::Solid(self.text_color));
    }

    fn resolve_color(&self, palette_index: u16, alpha_mul: f32) -> Rgba {
        match &self.palette {
            Some(palette) => palette.resolve(palette_index, alpha_mul, self.text_color),
            None => Rgba {
                a: self.text_color.a * alpha_mul,
                ..self.text_color
            },
        }
    }

    fn traverse(&mut self, paint: &Paint, canvas: &mut impl Canvas) -> Result<(), PaintError> {
        self.depth += 1;
        let result = if self.depth > MAX_TRAVERSAL_DEPTH {
            Err(PaintError::DepthLimitExceeded)
        } else {
            self.traverse_inner(paint, canvas)
        };
        self.depth -= 1;
        result
    }

    fn traverse_inner(&mut self, paint: &Paint, canvas: &mut impl Canvas) -> Result<(), PaintError> {
        match resolve_paint(paint, &self.instancer) {
            ResolvedPaint::ColrLayers { range } => {
                for layer_index in range {
                    match self.source.layer_paint(layer_index) {
                        Some(layer_paint) => self.traverse(layer_paint, canvas)?,
                        None => warn!("COLR layer index {layer_index} out of range, skipping"),
                    }
                }
                Ok(())
            }
            ResolvedPaint::Solid { palette_index, alpha } => {
                let color = self.resolve_color(palette_index, alpha);
                canvas.fill(&Brush::Solid(color));
                Ok(())
            }
            ResolvedPaint::LinearGradient {
                p0,
                p1,
                p2,
                color_stops,
                extend,
            } => {
                let Some(line) = gradient::normalize_color_line(
                    &color_stops,
                    extend,
                    self.palette.as_ref(),
                    self.text_color,
                ) else {
                    self.fill_degenerate_gradient(&color_stops, canvas);
                    return Ok(());
                };
                let p3 = gradient::reduce_three_anchors_to_two(p0, p1, p2).unwrap_or_else(|| {
                    warn!("degenerate linear gradient rotation point, ignoring rotation");
                    p1
                });
                let (p0, p1) = gradient::reposition_linear(p0, p3, line.min_stop, line.max_stop);
                canvas.fill(&Brush::LinearGradient {
                    p0,
                    p1,
                    stops: line.stops,
                    extend,
                });
                Ok(())
            }
            ResolvedPaint::RadialGradient {
                c0,
                r0,
                c1,
                r1,
                color_stops,
                extend,
            } => {
                let Some(line) = gradient::normalize_color_line(
                    &color_stops,
                    extend,
                    self.palette.as_ref(),
                    self.text_color,
                ) else {
                    self.fill_degenerate_gradient(&color_stops, canvas);
                    return Ok(());
                };
                let (r0, r1) = (r0.max(0.0), r1.max(0.0));
                let (c0, r0, c1, r1) = gradient::reposition_radial(c0, r0, c1, r1, line.min_stop, line.max_stop);
                canvas.fill(&Brush::RadialGradient {
                    c0,
                    r0,
                    c1,
                    r1,
                    stops: line.stops,
                    extend,
                });
                Ok(())
            }
            ResolvedPaint::SweepGradient {
                center,
                start_angle,
                end_angle,
                color_stops,
                extend,
            } => {
                let Some(line) = gradient::normalize_color_line(
                    &color_stops,
                    extend,
                    self.palette.as_ref(),
                    self.text_color,
                ) else {
                    self.fill_degenerate_gradient(&color_stops, canvas);
                    return Ok(());
                };
                let (start_angle, end_angle) =
                    gradient::reposition_sweep(start_angle, end_angle, line.min_stop, line.max_stop);
                canvas.fill(&Brush::SweepGradient {
                    center,
                    start_angle,
                    end_angle,
                    stops: line.stops,
                    extend,
                });
                Ok(())
            }
            ResolvedPaint::Glyph { glyph_id, paint } => {
                let mut guard = ClipGuard::glyph(canvas, glyph_id);
                self.traverse(paint, guard.canvas())
            }
            ResolvedPaint::ColrGlyph { glyph_id } => self.draw_colr_glyph(glyph_id, canvas),
            ResolvedPaint::Transform { affine, paint } => {
                let mut guard = TransformGuard::new(canvas, affine);
                self.traverse(paint, guard.canvas())
            }
            ResolvedPaint::Composite { source, mode, backdrop } => {
                let mut outer = LayerGuard::new(canvas, crate::paint::CompositeMode::SrcOver);
                self.traverse(backdrop, outer.canvas())?;
                let mut inner = LayerGuard::new(outer.canvas(), mode);
                self.traverse(source, inner.canvas())
            }
        }
    }

    /// Returns `glyph_id`'s drawable extent, in font design units.
    ///
    /// A COLRv1 glyph with a `ClipList` entry reports that clip box (resolved
    /// against the current variation location) without inspecting any paint
    /// -- the whole point of a declared clip box is to let a caller compute
    /// bounds without walking the paint graph. A COLRv0 glyph reports the
    /// union of its layers' outline bounds; anything else reports its own
    /// outline bounds.
    pub fn glyph_bounds(&self, glyph_id: GlyphId) -> BoundingBox<f32> {
        if self.source.v1_base_paint(glyph_id).is_some() {
            if let Some(clip_box) = self.source.v1_clip_box(glyph_id) {
                return resolve_clip_box(&clip_box, &self.instancer);
            }
            return self.source.glyph_outline_bounds(glyph_id);
        }
        if let Some(layers) = self.source.v0_layers(glyph_id) {
            let empty = BoundingBox {
                x_min: f32::INFINITY,
                y_min: f32::INFINITY,
                x_max: f32::NEG_INFINITY,
                y_max: f32::NEG_INFINITY,
            };
            return layers
                .iter()
                .map(|layer| self.source.glyph_outline_bounds(layer.glyph_id))
                .fold(empty, union_bounds);
        }
        self.source.glyph_outline_bounds(glyph_id)
    }

    fn draw_colr_glyph(&mut self, glyph_id: GlyphId, canvas: &mut impl Canvas) -> Result<(), PaintError> {
        if !self.visited.insert(glyph_id) {
            return Err(PaintError::PaintCycleDetected(glyph_id));
        }
        let result = match self.source.v1_base_paint(glyph_id) {
            Some(paint) => self.draw_v1_root(glyph_id, paint, canvas),
            None => Err(PaintError::GlyphNotFound(glyph_id)),
        };
        self.visited.remove(&glyph_id);
        result
    }

    /// Fewer than two color stops (after palette/variation resolution) is
    /// not representable as a gradient; fall back to a solid fill of
    /// whatever color is available, matching the behavior of the reference
    /// implementation's degenerate color-line path.
    fn fill_degenerate_gradient(&self, color_stops: &[crate::variation::ResolvedStop], canvas: &mut impl Canvas) {
        match color_stops.last() {
            Some(stop) => {
                warn!("gradient has fewer than two color stops, falling back to solid fill");
                canvas.fill(&Brush::Solid(self.resolve_color(stop.palette_index, stop.alpha)));
            }
            None => warn!("gradient has no color stops, skipping fill"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point};
    use crate::paint::{ClipBox, CompositeMode, LinearGradientPaint, RotatePaint, ColorLine, ColorStop};
    use crate::color::Extend;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingCanvas {
        ops: RefCell<Vec<String>>,
    }

    impl Canvas for RecordingCanvas {
        fn push_transform(&mut self, _transform: Transform) {
            self.ops.borrow_mut().push("push_transform".into());
        }
        fn pop_transform(&mut self) {
            self.ops.borrow_mut().push("pop_transform".into());
        }
        fn push_clip_glyph(&mut self, glyph_id: GlyphId) {
            self.ops.borrow_mut().push(format!("push_clip_glyph({glyph_id:?})"));
        }
        fn push_clip_box(&mut self, _clip_box: BoundingBox<f32>) {
            self.ops.borrow_mut().push("push_clip_box".into());
        }
        fn pop_clip(&mut self) {
            self.ops.borrow_mut().push("pop_clip".into());
        }
        fn push_layer(&mut self, mode: CompositeMode) {
            self.ops.borrow_mut().push(format!("push_layer({mode:?})"));
        }
        fn pop_layer(&mut self) {
            self.ops.borrow_mut().push("pop_layer".into());
        }
        fn fill(&mut self, brush: &Brush) {
            self.ops.borrow_mut().push(format!("fill({brush:?})"));
        }
    }

    struct MockSource {
        root: Paint,
        clip: Option<ClipBox>,
    }

    impl GlyphSource for MockSource {
        fn v1_base_paint(&self, glyph_id: GlyphId) -> Option<&Paint> {
            (glyph_id == GlyphId::new(1)).then_some(&self.root)
        }
        fn v1_clip_box(&self, _glyph_id: GlyphId) -> Option<ClipBox> {
            self.clip
        }
        fn layer_paint(&self, _layer_index: u32) -> Option<&Paint> {
            None
        }
        fn v0_layers(&self, _glyph_id: GlyphId) -> Option<Vec<V0Layer>> {
            None
        }
        fn palette(&self, _palette_index: u16) -> Option<Palette> {
            Some(Palette::new(vec![Rgba::new(1.0, 0.0, 0.0, 1.0)]))
        }
        fn glyph_outline_bounds(&self, _glyph_id: GlyphId) -> BoundingBox<f32> {
            BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 10.0,
                y_max: 10.0,
            }
        }
    }

    fn instancer() -> Instancer<'static> {
        Instancer::STATIC
    }

    #[test]
    fn solid_paint_fills_once() {
        let source = MockSource {
            root: Paint::Solid {
                palette_index: 0,
                alpha: 1.0,
                var_index_base: None,
            },
            clip: None,
        };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        interp.draw_glyph(GlyphId::new(1), &mut canvas).unwrap();
        assert_eq!(canvas.ops.into_inner(), vec!["fill(Solid(Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 }))"]);
    }

    #[test]
    fn clip_box_wraps_whole_traversal() {
        let source = MockSource {
            root: Paint::Solid {
                palette_index: 0,
                alpha: 1.0,
                var_index_base: None,
            },
            clip: Some(ClipBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 10.0,
                y_max: 10.0,
                var_index_base: None,
            }),
        };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        interp.draw_glyph(GlyphId::new(1), &mut canvas).unwrap();
        let ops = canvas.ops.into_inner();
        assert_eq!(ops.first().unwrap(), "push_clip_box");
        assert_eq!(ops.last().unwrap(), "pop_clip");
    }

    #[test]
    fn rotate_paint_pushes_and_pops_transform() {
        let inner = Paint::Solid {
            palette_index: 0,
            alpha: 1.0,
            var_index_base: None,
        };
        let root = Paint::Rotate(RotatePaint {
            angle: 45.0,
            around_center: None,
            var_index_base: None,
            paint: Box::new(inner),
        });
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        interp.draw_glyph(GlyphId::new(1), &mut canvas).unwrap();
        let ops = canvas.ops.into_inner();
        assert_eq!(ops[0], "push_transform");
        assert_eq!(*ops.last().unwrap(), "pop_transform");
    }

    #[test]
    fn self_referential_colr_glyph_is_a_cycle() {
        let root = Paint::ColrGlyph {
            glyph_id: GlyphId::new(1),
        };
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        let result = interp.draw_glyph(GlyphId::new(1), &mut canvas);
        assert_eq!(result, Err(PaintError::PaintCycleDetected(GlyphId::new(1))));
    }

    #[test]
    fn single_stop_linear_gradient_falls_back_to_solid() {
        let root = Paint::LinearGradient(LinearGradientPaint {
            color_line: ColorLine {
                stops: vec![ColorStop {
                    stop_offset: 0.0,
                    palette_index: 0,
                    alpha: 1.0,
                    var_index_base: None,
                }],
                extend: Extend::Pad,
            },
            p0: Point::new(0.0, 0.0),
            p1: Point::new(1.0, 0.0),
            p2: Point::new(0.0, 1.0),
            var_index_base: None,
        });
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        interp.draw_glyph(GlyphId::new(1), &mut canvas).unwrap();
        let ops = canvas.ops.into_inner();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].starts_with("fill(Solid"));
    }

    #[test]
    fn linear_gradient_reduces_anchors_before_repositioning() {
        // spec scenario 3: p0=(0,0), p1=(100,0), p2=(0,100), stops at
        // -0.25/0.25/1.25 repositioned to (-25,0)/(125,0) -- the three
        // anchors must be reduced to two on the *original* p0/p1/p2 first,
        // then the reduced pair repositioned by minStop/maxStop.
        let root = Paint::LinearGradient(LinearGradientPaint {
            color_line: ColorLine {
                stops: vec![
                    ColorStop {
                        stop_offset: -0.25,
                        palette_index: 0,
                        alpha: 1.0,
                        var_index_base: None,
                    },
                    ColorStop {
                        stop_offset: 0.25,
                        palette_index: 0,
                        alpha: 1.0,
                        var_index_base: None,
                    },
                    ColorStop {
                        stop_offset: 1.25,
                        palette_index: 0,
                        alpha: 1.0,
                        var_index_base: None,
                    },
                ],
                extend: Extend::Pad,
            },
            p0: Point::new(0.0, 0.0),
            p1: Point::new(100.0, 0.0),
            p2: Point::new(0.0, 100.0),
            var_index_base: None,
        });
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let mut interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let mut canvas = RecordingCanvas::default();
        interp.draw_glyph(GlyphId::new(1), &mut canvas).unwrap();
        let ops = canvas.ops.into_inner();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].contains("p0: Point { x: -25.0, y: 0.0 }"), "{}", ops[0]);
        assert!(ops[0].contains("p1: Point { x: 125.0, y: 0.0 }"), "{}", ops[0]);
    }

    #[test]
    fn uncolored_glyph_fills_with_text_color() {
        let root = Paint::Solid {
            palette_index: 0,
            alpha: 1.0,
            var_index_base: None,
        };
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let text_color = Rgba::new(0.2, 0.3, 0.4, 1.0);
        let mut interp = Interpreter::new(&source, instancer(), palette, text_color);
        let mut canvas = RecordingCanvas::default();
        // glyph id 2 has no v1 paint, no v0 layers -> uncolored fallback
        interp.draw_glyph(GlyphId::new(2), &mut canvas).unwrap();
        let ops = canvas.ops.into_inner();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], "push_transform");
        assert!(ops[1].starts_with("push_clip_glyph"));
        assert!(ops[2].contains("0.2") && ops[2].contains("0.3") && ops[2].contains("0.4"));
        assert_eq!(ops[3], "pop_clip");
        assert_eq!(ops[4], "pop_transform");
    }

    #[test]
    fn glyph_bounds_prefers_declared_clip_box_over_outline() {
        let root = Paint::Solid {
            palette_index: 0,
            alpha: 1.0,
            var_index_base: None,
        };
        let source = MockSource {
            root,
            clip: Some(ClipBox {
                x_min: -5.0,
                y_min: -5.0,
                x_max: 500.0,
                y_max: 500.0,
                var_index_base: None,
            }),
        };
        let palette = source.palette(0);
        let interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        let bounds = interp.glyph_bounds(GlyphId::new(1));
        assert_eq!(bounds.x_min, -5.0);
        assert_eq!(bounds.x_max, 500.0);
    }

    #[test]
    fn glyph_bounds_falls_back_to_outline_for_uncolored_glyph() {
        let root = Paint::Solid {
            palette_index: 0,
            alpha: 1.0,
            var_index_base: None,
        };
        let source = MockSource { root, clip: None };
        let palette = source.palette(0);
        let interp = Interpreter::new(&source, instancer(), palette, Rgba::new(0.0, 0.0, 0.0, 1.0));
        // glyph id 2 has neither a v1 root nor v0 layers.
        let bounds = interp.glyph_bounds(GlyphId::new(2));
        assert_eq!(bounds, BoundingBox {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 10.0,
            y_max: 10.0,
        });
    }
}
