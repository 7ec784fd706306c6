//! The drawing surface contract the paint-tree interpreter renders against.
//!
//! A `Canvas` is this crate's only external rendering collaborator: a thin
//! seam over whatever concrete 2D backend (Skia, Cairo, CoreGraphics, an SVG
//! writer, ...) the embedder has. The interpreter never draws a glyph
//! outline itself -- `fill_glyph` delegates that to the canvas, which is
//! expected to already know how to rasterize the glyph identified by a
//! [`GlyphId`] -- it only sequences transform/clip/layer state and hands the
//! canvas a resolved [`Brush`]. Push/pop state management is wrapped in RAII
//! guards rather than left to callers to pair by hand.

use crate::color::{Extend, Rgba, ResolvedColorStop};
use crate::geometry::{BoundingBox, Point, Transform};
use crate::paint::CompositeMode;
use font_types::GlyphId;

/// A fill, fully resolved to device-independent values: no palette indices,
/// no variation deltas, no raw color-line offsets left unnormalized.
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Rgba),
    LinearGradient {
        p0: Point<f32>,
        p1: Point<f32>,
        stops: Vec<ResolvedColorStop>,
        extend: Extend,
    },
    RadialGradient {
        c0: Point<f32>,
        r0: f32,
        c1: Point<f32>,
        r1: f32,
        stops: Vec<ResolvedColorStop>,
        extend: Extend,
    },
    /// A sweep gradient. A backend with a native conic-gradient primitive
    /// fills directly from `center`/`start_angle`/`end_angle`/`stops`; one
    /// without can call [`crate::sweep::build_patches`] itself, since only
    /// the backend knows the radius needed to cover its own fill region.
    SweepGradient {
        center: Point<f32>,
        /// Degrees. A backend tessellating via [`crate::sweep::build_patches`]
        /// converts to radians itself.
        start_angle: f32,
        end_angle: f32,
        stops: Vec<ResolvedColorStop>,
        extend: Extend,
    },
}

/// The rendering surface the interpreter draws onto.
///
/// Implementations must treat `push_*`/`pop_*` calls as a stack: the
/// interpreter always balances them, but a defensive implementation should
/// not panic if it doesn't see a push for every pop (robustness against
/// future interpreter bugs is the implementation's own business).
pub trait Canvas {
    /// Pushes `transform`, composing with whatever transform is already
    /// active, so that subsequent drawing happens in the new coordinate
    /// space.
    fn push_transform(&mut self, transform: Transform);
    fn pop_transform(&mut self);

    /// Intersects the current clip with the outline of `glyph_id`.
    fn push_clip_glyph(&mut self, glyph_id: GlyphId);
    /// Intersects the current clip with a rectangle, in the current
    /// coordinate space.
    fn push_clip_box(&mut self, clip_box: BoundingBox<f32>);
    fn pop_clip(&mut self);

    /// Opens an isolated compositing group that the matching `pop_layer`
    /// composites onto its backdrop using `mode`.
    fn push_layer(&mut self, mode: CompositeMode);
    fn pop_layer(&mut self);

    /// Fills the current clip with `brush`.
    fn fill(&mut self, brush: &Brush);

    /// Fills `glyph_id`'s outline, transformed by `transform`, with `brush`.
    ///
    /// The default implementation composes the primitive operations above;
    /// a backend may override it to avoid the extra clip/transform push when
    /// it can fill a transformed glyph outline directly.
    fn fill_glyph(&mut self, glyph_id: GlyphId, transform: Transform, brush: &Brush) {
        self.push_transform(transform);
        self.push_clip_glyph(glyph_id);
        self.fill(brush);
        self.pop_clip();
        self.pop_transform();
    }
}

/// Pushes `transform` on construction and pops it on drop, so a transform
/// pushed on one branch of the interpreter's recursion is always undone
/// before control returns to its caller, even across an early `?` return.
pub struct TransformGuard<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> TransformGuard<'a, C> {
    pub fn new(canvas: &'a mut C, transform: Transform) -> Self {
        canvas.push_transform(transform);
        Self { canvas }
    }

    pub fn canvas(&mut self) -> &mut C {
        self.canvas
    }
}

impl<'a, C: Canvas + ?Sized> Drop for TransformGuard<'a, C> {
    fn drop(&mut self) {
        self.canvas.pop_transform();
    }
}

/// RAII counterpart of [`Canvas::push_clip_glyph`]/[`Canvas::push_clip_box`].
pub enum ClipGuard<'a, C: Canvas + ?Sized> {
    Glyph { canvas: &'a mut C },
    Box { canvas: &'a mut C },
}

impl<'a, C: Canvas + ?Sized> ClipGuard<'a, C> {
    pub fn glyph(canvas: &'a mut C, glyph_id: GlyphId) -> Self {
        canvas.push_clip_glyph(glyph_id);
        Self::Glyph { canvas }
    }

    pub fn rect(canvas: &'a mut C, clip_box: BoundingBox<f32>) -> Self {
        canvas.push_clip_box(clip_box);
        Self::Box { canvas }
    }

    pub fn canvas(&mut self) -> &mut C {
        match self {
            Self::Glyph { canvas } | Self::Box { canvas } => canvas,
        }
    }
}

impl<'a, C: Canvas + ?Sized> Drop for ClipGuard<'a, C> {
    fn drop(&mut self) {
        self.canvas().pop_clip();
    }
}

/// RAII counterpart of [`Canvas::push_layer`].
pub struct LayerGuard<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> LayerGuard<'a, C> {
    pub fn new(canvas: &'a mut C, mode: CompositeMode) -> Self {
        canvas.push_layer(mode);
        Self { canvas }
    }

    pub fn canvas(&mut self) -> &mut C {
        self.canvas
    }
}

impl<'a, C: Canvas + ?Sized> Drop for LayerGuard<'a, C> {
    fn drop(&mut self) {
        self.canvas.pop_layer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingCanvas {
        ops: Vec<&'static str>,
    }

    impl Canvas for RecordingCanvas {
        fn push_transform(&mut self, _transform: Transform) {
            self.ops.push("push_transform");
        }
        fn pop_transform(&mut self) {
            self.ops.push("pop_transform");
        }
        fn push_clip_glyph(&mut self, _glyph_id: GlyphId) {
            self.ops.push("push_clip_glyph");
        }
        fn push_clip_box(&mut self, _clip_box: BoundingBox<f32>) {
            self.ops.push("push_clip_box");
        }
        fn pop_clip(&mut self) {
            self.ops.push("pop_clip");
        }
        fn push_layer(&mut self, _mode: CompositeMode) {
            self.ops.push("push_layer");
        }
        fn pop_layer(&mut self) {
            self.ops.push("pop_layer");
        }
        fn fill(&mut self, _brush: &Brush) {
            self.ops.push("fill");
        }
    }

    #[test]
    fn transform_guard_pops_on_drop() {
        let mut canvas = RecordingCanvas::default();
        {
            let _guard = TransformGuard::new(&mut canvas, Transform::IDENTITY);
        }
        assert_eq!(canvas.ops, vec!["push_transform", "pop_transform"]);
    }

    #[test]
    fn nested_guards_pop_in_reverse_order() {
        let mut canvas = RecordingCanvas::default();
        {
            let mut t = TransformGuard::new(&mut canvas, Transform::IDENTITY);
            let _layer = LayerGuard::new(t.canvas(), CompositeMode::SrcOver);
        }
        assert_eq!(canvas.ops, vec!["push_transform", "push_layer", "pop_layer", "pop_transform"]);
    }

    #[test]
    fn default_fill_glyph_balances_pushes_and_pops() {
        let mut canvas = RecordingCanvas::default();
        canvas.fill_glyph(GlyphId::new(1), Transform::IDENTITY, &Brush::Solid(Rgba::new(0.0, 0.0, 0.0, 1.0)));
        assert_eq!(
            canvas.ops,
            vec!["push_transform", "push_clip_glyph", "fill", "pop_clip", "pop_transform"]
        );
    }
}
