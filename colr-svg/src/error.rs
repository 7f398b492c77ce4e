//! Errors returned while extracting and post-processing color glyphs.

use skrifa::{color::PaintError, outline::DrawError, raw::ReadError, GlyphId};
use thiserror::Error;

/// An error produced by this crate.
///
/// None of these are fatal to a [`ColrSvg`](crate::ColrSvg) instance; a
/// failed call leaves the extractor usable for the next one.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("font has no COLR table")]
    MissingColrTable,

    #[error("unsupported COLR version {0}")]
    UnsupportedColrVersion(u16),

    #[error("character {0:?} is not in the character map")]
    CharacterNotMapped(char),

    #[error("no ligature found for {0:?}")]
    LigatureNotFound(String),

    #[error("glyph {0} has no color record")]
    GlyphHasNoColorRecord(GlyphId),

    #[error("empty character sequence")]
    EmptyInput,

    #[error("no view box for glyph {0}")]
    NoViewBox(GlyphId),

    #[error("glyph {0} has no outline")]
    MissingOutline(GlyphId),

    #[error("malformed viewBox {0:?}")]
    MalformedViewBox(String),

    #[error("degenerate viewBox with size {width}x{height}")]
    DegenerateViewBox { width: f64, height: f64 },

    #[error("invalid target size {0}")]
    InvalidSize(f64),

    #[error("failed to read font: {0}")]
    Read(#[from] ReadError),

    #[error("failed to draw glyph {glyph_id}: {inner}")]
    Draw { glyph_id: GlyphId, inner: DrawError },

    #[error("failed to paint color glyph: {0}")]
    Paint(PaintError),
}
