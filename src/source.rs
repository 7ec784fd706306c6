//! The font-loader collaborator boundary.
//!
//! Locating and decoding `COLR`/`CPAL`/`fvar`/item-variation-store data from
//! a binary font file, extracting glyph outlines, and shaping text into a
//! glyph sequence are all explicitly out of scope for this crate -- they are
//! the responsibility of whatever `GlyphSource` implementation the embedder
//! plugs in (backed by, e.g., a binary table parser). This trait is the
//! entire surface this crate needs from that collaborator.

use crate::palette::Palette;
use crate::paint::{ClipBox, Paint};
use font_types::{BoundingBox, GlyphId};

/// One entry of a COLRv0 (simple, non-paint-graph) color glyph: a component
/// glyph outline plus the palette index to fill it with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct V0Layer {
    pub glyph_id: GlyphId,
    pub palette_index: u16,
}

/// Everything the paint-tree interpreter needs to know about a font's color
/// glyph data, with binary table decoding already done.
pub trait GlyphSource {
    /// The root paint of `glyph_id`'s COLRv1 entry, if it has one.
    fn v1_base_paint(&self, glyph_id: GlyphId) -> Option<&Paint>;

    /// The root paint's clip box, if the COLRv1 entry declared one.
    fn v1_clip_box(&self, glyph_id: GlyphId) -> Option<ClipBox>;

    /// Resolves a `ColrLayers` paint's `first_layer_index..first_layer_index
    /// + num_layers` range against the font's shared layer list.
    fn layer_paint(&self, layer_index: u32) -> Option<&Paint>;

    /// `glyph_id`'s COLRv0 layers, if it has a (non-paint-graph) COLRv0
    /// entry. Layers are in painter's-algorithm (back-to-front) order.
    fn v0_layers(&self, glyph_id: GlyphId) -> Option<Vec<V0Layer>>;

    /// Whether `glyph_id` has any color glyph data at all (v1 or v0). Used to
    /// decide between color rendering and the plain-outline fallback.
    fn has_color_glyph(&self, glyph_id: GlyphId) -> bool {
        self.v1_base_paint(glyph_id).is_some() || self.v0_layers(glyph_id).is_some()
    }

    /// The palette at `palette_index`, already resolved for the current
    /// variation location and CPAL's v1 per-entry label/override data, if
    /// `palette_index` is in range.
    fn palette(&self, palette_index: u16) -> Option<Palette>;

    /// The outline bounding box of `glyph_id` alone, in font design units.
    /// Used by [`crate::interpreter::Interpreter::glyph_bounds`]'s
    /// COLRv0/plain-outline fallback paths; never consulted for a COLRv1
    /// glyph that has a `ClipList` entry.
    fn glyph_outline_bounds(&self, glyph_id: GlyphId) -> BoundingBox<f32>;
}
