//! Extract color glyphs from the COLR table of a font as SVG.
//!
//! A [`ColrSvg`] resolves a character, or a sequence of characters that
//! forms a ligature, to a glyph and converts that glyph's COLR layers (v0) or
//! paint graph (v1) into an [`svg::Element`] tree. The [`svg`] module has
//! helpers to serialize and rescale the result.
//!
//! Font parsing, outline extraction and paint graph traversal come from
//! [`skrifa`].

#![forbid(unsafe_code)]

mod convert;
mod error;
mod extract;
pub mod ligature;
mod paint;
pub mod palette;
pub mod pen;
pub mod svg;
mod view_box;

pub use error::Error;
pub use extract::{ColrSvg, ColrVersion, ViewBoxFn};
pub use view_box::{font_to_view_box, glyph_region, ViewBox};

/// The font parsing crate used in our public API.
pub use skrifa;
