//! Error taxonomy for the paint-tree interpreter.
//!
//! Only [`PaintError`] is fatal and aborts a render; every other recoverable
//! condition (unknown paint formats, degenerate gradients, out-of-range
//! palette indices, out-of-range variation indices) is handled inline with a
//! logged warning and a documented fallback, so it never reaches this type.

use font_types::GlyphId;

/// Depth at which the interpreter gives up and reports [`PaintError::DepthLimitExceeded`]
/// instead of recursing further.
///
/// Matches the nesting limit HarfBuzz uses for COLR paint graphs.
pub const MAX_TRAVERSAL_DEPTH: u32 = 64;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PaintError {
    /// A `ColrGlyph` paint referenced a base glyph that is already being
    /// expanded higher up the call stack.
    #[error("paint cycle detected at base glyph {0}")]
    PaintCycleDetected(GlyphId),

    /// Traversal exceeded [`MAX_TRAVERSAL_DEPTH`]; guards against stack
    /// overflow from pathologically deep (but acyclic) paint graphs.
    #[error("paint graph traversal depth limit exceeded")]
    DepthLimitExceeded,

    /// A `ColrGlyph` paint referenced a base glyph with no COLRv1 root paint.
    #[error("no COLRv1 base glyph found for glyph id {0}")]
    GlyphNotFound(GlyphId),
}
