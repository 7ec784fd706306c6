//! A COLRv1/COLRv0 color-glyph paint-tree interpreter.
//!
//! This crate does not parse OpenType binary tables, extract glyph outlines,
//! or shape text -- those are the job of the [`source::GlyphSource`]
//! collaborator the embedder plugs in (typically backed by `read-fonts` or
//! `skrifa`). What it does is walk the *decoded* `COLR` paint graph for one
//! glyph and drive a [`canvas::Canvas`] implementation with a sequence of
//! fill, clip, transform, and composite-layer commands that reproduce the
//! glyph's color artwork, including COLRv1's gradient, transform, and
//! compositing paint kinds, CPAL palette resolution, and `fvar`/item-
//! variation-store instancing of variable paint attributes.
//!
//! The entry point is [`interpreter::Interpreter::draw_glyph`].

#![forbid(unsafe_code)]
#![warn(clippy::doc_markdown)]

pub mod canvas;
pub mod color;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod interpreter;
pub mod paint;
pub mod palette;
pub mod source;
#[cfg(feature = "sweep-patches")]
pub mod sweep;
pub mod variation;

pub use canvas::{Brush, Canvas};
pub use color::{Extend, Rgba};
pub use error::PaintError;
pub use error::MAX_TRAVERSAL_DEPTH;
pub use geometry::Transform;
pub use interpreter::Interpreter;
pub use paint::Paint;
pub use palette::Palette;
pub use source::GlyphSource;
pub use variation::Instancer;
