//! The decoded COLRv1 paint graph.
//!
//! These types stand in for the "decoded record tree" an external font
//! library (one that has already parsed the raw `COLR` table) would hand to
//! this crate. They intentionally do not distinguish a paint's literal binary
//! format code from its "Var" counterpart the way the OpenType table does --
//! instead every node carries an optional `var_index_base`, which is `None`
//! for formats that have no variation and `Some(base)` for the variable
//! forms. The paint-tree interpreter does not care which format code a
//! record came from, only whether it has live deltas to apply, so this
//! collapses paired formats (e.g. `Scale`/`VarScale`/`ScaleUniform`/
//! `VarScaleUniform`) into a single variant; see `DESIGN.md`.

use crate::color::Extend;
use font_types::{GlyphId, Point};

/// One stop in a [`ColorLine`], still carrying a palette index rather than a
/// resolved color.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorStop {
    pub stop_offset: f32,
    pub palette_index: u16,
    pub alpha: f32,
    /// `Some(base)` for `VarColorStop`; the two variable attributes are
    /// `stop_offset` then `alpha`, in that order.
    pub var_index_base: Option<u32>,
}

/// An ordered sequence of color stops plus an extend mode.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLine {
    pub stops: Vec<ColorStop>,
    pub extend: Extend,
}

/// The 28 COLRv1 composite/blend modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompositeMode {
    Clear,
    Src,
    Dest,
    SrcOver,
    DestOver,
    SrcIn,
    DestIn,
    SrcOut,
    DestOut,
    SrcAtop,
    DestAtop,
    Xor,
    Plus,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    HslHue,
    HslSaturation,
    HslColor,
    HslLuminosity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradientPaint {
    pub color_line: ColorLine,
    pub p0: Point<f32>,
    pub p1: Point<f32>,
    pub p2: Point<f32>,
    /// Variable order: x0, y0, x1, y1, x2, y2.
    pub var_index_base: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradientPaint {
    pub color_line: ColorLine,
    pub c0: Point<f32>,
    pub r0: f32,
    pub c1: Point<f32>,
    pub r1: f32,
    /// Variable order: x0, y0, r0, x1, y1, r1.
    pub var_index_base: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SweepGradientPaint {
    pub color_line: ColorLine,
    pub center: Point<f32>,
    /// Degrees, matching the canvas contract's `drawPathSweepGradient`.
    pub start_angle: f32,
    /// Degrees, matching the canvas contract's `drawPathSweepGradient`.
    pub end_angle: f32,
    /// Variable order: centerX, centerY, startAngle, endAngle.
    pub var_index_base: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AffinePaint {
    pub xx: f32,
    pub yx: f32,
    pub xy: f32,
    pub yy: f32,
    pub dx: f32,
    pub dy: f32,
    /// Variable order: xx, yx, xy, yy, dx, dy.
    pub var_index_base: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranslatePaint {
    pub dx: f32,
    pub dy: f32,
    /// Variable order: dx, dy.
    pub var_index_base: Option<u32>,
    pub paint: Box<Paint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RotatePaint {
    pub angle: f32,
    pub around_center: Option<Point<f32>>,
    /// Variable order: angle[, centerX, centerY].
    pub var_index_base: Option<u32>,
    pub paint: Box<Paint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalePaint {
    pub scale_x: f32,
    pub scale_y: f32,
    pub around_center: Option<Point<f32>>,
    /// Variable order: scaleX, scaleY[, centerX, centerY], or scale[, centerX,
    /// centerY] for the uniform forms (scaleX == scaleY is pre-broadcast by
    /// the font-loader collaborator).
    pub var_index_base: Option<u32>,
    pub paint: Box<Paint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkewPaint {
    pub x_skew_angle: f32,
    pub y_skew_angle: f32,
    pub around_center: Option<Point<f32>>,
    /// Variable order: xSkewAngle, ySkewAngle[, centerX, centerY].
    pub var_index_base: Option<u32>,
    pub paint: Box<Paint>,
}

/// A node in the COLRv1 paint DAG.
///
/// See `SPEC_FULL.md` section 3.1 for the field-by-field description this
/// mirrors.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    ColrLayers {
        first_layer_index: u32,
        num_layers: u32,
    },
    Solid {
        palette_index: u16,
        alpha: f32,
        var_index_base: Option<u32>,
    },
    LinearGradient(LinearGradientPaint),
    RadialGradient(RadialGradientPaint),
    SweepGradient(SweepGradientPaint),
    Glyph {
        glyph_id: GlyphId,
        paint: Box<Paint>,
    },
    ColrGlyph {
        glyph_id: GlyphId,
    },
    Transform(AffinePaint, Box<Paint>),
    Translate(TranslatePaint),
    Rotate(RotatePaint),
    Scale(ScalePaint),
    Skew(SkewPaint),
    Composite {
        source: Box<Paint>,
        mode: CompositeMode,
        backdrop: Box<Paint>,
    },
}

/// A clip box, in font design units, optionally variable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    /// Variable order: xMin, yMin, xMax, yMax.
    pub var_index_base: Option<u32>,
}
