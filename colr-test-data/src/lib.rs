//! Test fonts shared between the colr-svg crates.
//!
//! The fonts are assembled in code rather than checked in as binaries so
//! the glyph ids, outlines and COLR records they contain are visible next to
//! the tests that depend on them. All fonts share the same glyph set, cmap
//! and glyph metrics and differ only in their COLR, GSUB and OS/2 tables.

pub mod bebuffer;
pub mod tables;

use bebuffer::BeBuffer;
use tables::{LigatureRule, Paint, F2DOT14_ONE};
use write_fonts::{types::Tag, FontBuilder};

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;
pub const ADVANCE_WIDTH: u16 = 600;
/// Typographic metrics of [`with_typo_metrics`], different from hhea.
pub const TYPO_ASCENDER: i16 = 900;
pub const TYPO_DESCENDER: i16 = -300;

/// Glyph identifiers in the test fonts.
pub mod glyphs {
    pub const NOTDEF: u16 = 0;
    /// A rectangle from (100, 0) to (500, 700).
    pub const SQUARE: u16 = 1;
    /// A single contour made only of off-curve points.
    pub const BLOB: u16 = 2;
    pub const SMILEY: u16 = 3;
    pub const LETTER_A: u16 = 4;
    pub const REGIONAL_U: u16 = 5;
    pub const REGIONAL_S: u16 = 6;
    pub const FLAG_US: u16 = 7;
    pub const REGIONAL_F: u16 = 8;
    /// Ligature of U F F, a made up sequence.
    pub const FLAG_UFF: u16 = 9;
    pub const COUNT: u16 = 10;
}

/// Characters mapped by the test fonts.
pub mod chars {
    pub const SMILEY: char = '\u{1F600}';
    pub const LETTER_A: char = 'a';
    pub const REGIONAL_U: char = '\u{1F1FA}';
    pub const REGIONAL_S: char = '\u{1F1F8}';
    pub const REGIONAL_F: char = '\u{1F1EB}';
    /// Not present in any cmap.
    pub const UNMAPPED: char = 'z';
}

/// Palette entries as `(r, g, b, a)`.
pub const PALETTE: [[u8; 4]; 3] = [
    [0xFF, 0x00, 0x00, 0xFF],
    [0x00, 0x00, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00, 0x80],
];

/// Index used in COLR for the foreground color.
pub const FOREGROUND: u16 = 0xFFFF;

pub const SQUARE_CONTOUR: [tables::ContourPoint; 4] = [
    (100, 0, true),
    (500, 0, true),
    (500, 700, true),
    (100, 700, true),
];

pub const BLOB_CONTOUR: [tables::ContourPoint; 4] = [
    (300, 100, false),
    (500, 350, false),
    (300, 600, false),
    (100, 350, false),
];

/// A COLRv0 font.
///
/// * `SMILEY` has two layers: `SQUARE` in palette color 0 and `BLOB` in
///   palette color 1.
/// * `FLAG_US` has one `SQUARE` layer in palette color 2 (half transparent).
/// * `FLAG_UFF` has one `BLOB` layer in the foreground color.
pub fn colr_v0() -> Vec<u8> {
    build_font(Some(colr_v0_table(0)), Some(default_gsub()), None)
}

/// A COLRv1 font with the same base glyphs as [`colr_v0`].
///
/// * `SMILEY`: translate by (10, 20), then `BLOB` filled with a linear
///   gradient from palette color 0 to palette color 1.
/// * `FLAG_US`: `SQUARE` filled with palette color 1 at alpha 0.5.
/// * `FLAG_UFF`: `BLOB` filled with palette color 0.
pub fn colr_v1() -> Vec<u8> {
    build_font(Some(colr_v1_table(1)), Some(default_gsub()), None)
}

/// A font whose COLR table declares the given version.
///
/// The table is laid out as version 1, so versions above 1 still parse.
pub fn colr_with_version(version: u16) -> Vec<u8> {
    build_font(Some(colr_v1_table(version)), Some(default_gsub()), None)
}

/// A font with everything except a COLR table.
pub fn without_colr() -> Vec<u8> {
    build_font(None, Some(default_gsub()), None)
}

/// A COLRv0 font without a GSUB table.
pub fn without_gsub() -> Vec<u8> {
    build_font(Some(colr_v0_table(0)), None, None)
}

/// A COLRv1 font whose GSUB has two ligature subtables keyed on the same
/// first glyph, `REGIONAL_U`.
///
/// The first subtable maps U S to `FLAG_US`, the second U F F to `FLAG_UFF`.
pub fn shared_first_glyph() -> Vec<u8> {
    use glyphs::*;
    let first = tables::ligature_subst(&[(&[REGIONAL_U, REGIONAL_S], FLAG_US)]);
    let second =
        tables::ligature_subst(&[(&[REGIONAL_U, REGIONAL_F, REGIONAL_F], FLAG_UFF)]);
    let gsub = tables::gsub(&[tables::lookup(4, &[first, second])]);
    build_font(Some(colr_v1_table(1)), Some(gsub), None)
}

/// A COLRv1 font whose single ligature set lists U S twice, first for
/// `FLAG_US` and then for `FLAG_UFF`.
pub fn duplicate_ligature() -> Vec<u8> {
    use glyphs::*;
    let subst = tables::ligature_subst(&[
        (&[REGIONAL_U, REGIONAL_S], FLAG_US),
        (&[REGIONAL_U, REGIONAL_S], FLAG_UFF),
    ]);
    let gsub = tables::gsub(&[tables::lookup(4, &[subst])]);
    build_font(Some(colr_v1_table(1)), Some(gsub), None)
}

/// A COLRv1 font with an OS/2 table whose typographic ascender and
/// descender ([`TYPO_ASCENDER`], [`TYPO_DESCENDER`]) differ from hhea.
pub fn with_typo_metrics() -> Vec<u8> {
    let os2 = tables::os2(
        TYPO_ASCENDER,
        TYPO_DESCENDER,
        TYPO_ASCENDER as u16,
        TYPO_DESCENDER.unsigned_abs(),
    );
    build_font(Some(colr_v1_table(1)), Some(default_gsub()), Some(os2))
}

/// The default ligature rules.
///
/// * lookup 0 (single substitution): a -> SQUARE, ignored by ligature
///   resolution
/// * lookup 1 (ligature): U S -> `FLAG_US`, U F F -> `FLAG_UFF`
/// * lookup 2 (extension wrapping a ligature subtable): S U -> `FLAG_US`
pub const DEFAULT_LIGATURES: [LigatureRule<'static>; 3] = [
    (&[glyphs::REGIONAL_U, glyphs::REGIONAL_S], glyphs::FLAG_US),
    (
        &[glyphs::REGIONAL_U, glyphs::REGIONAL_F, glyphs::REGIONAL_F],
        glyphs::FLAG_UFF,
    ),
    (&[glyphs::REGIONAL_S, glyphs::REGIONAL_U], glyphs::FLAG_US),
];

fn default_gsub() -> BeBuffer {
    let single = tables::single_subst(
        &[glyphs::LETTER_A],
        glyphs::SQUARE as i16 - glyphs::LETTER_A as i16,
    );
    let ligatures = tables::ligature_subst(&DEFAULT_LIGATURES[..2]);
    let extended = tables::extension(4, &tables::ligature_subst(&DEFAULT_LIGATURES[2..]));
    tables::gsub(&[
        tables::lookup(1, &[single]),
        tables::lookup(4, &[ligatures]),
        tables::lookup(7, &[extended]),
    ])
}

fn colr_v0_table(version: u16) -> BeBuffer {
    use glyphs::*;
    let base_glyphs: [(u16, &[(u16, u16)]); 3] = [
        (SMILEY, &[(SQUARE, 0), (BLOB, 1)]),
        (FLAG_US, &[(SQUARE, 2)]),
        (FLAG_UFF, &[(BLOB, FOREGROUND)]),
    ];
    tables::colr_v0(version, &base_glyphs)
}

fn colr_v1_table(version: u16) -> BeBuffer {
    use glyphs::*;
    let smiley = Paint::Translate {
        dx: 10,
        dy: 20,
        paint: Box::new(Paint::Glyph {
            glyph_id: BLOB,
            paint: Box::new(Paint::LinearGradient {
                points: [100, 0, 500, 0, 100, 100],
                stops: vec![(0, 0), (F2DOT14_ONE, 1)],
            }),
        }),
    };
    let flag_us = Paint::Glyph {
        glyph_id: SQUARE,
        paint: Box::new(Paint::Solid {
            palette_index: 1,
            alpha: F2DOT14_ONE / 2,
        }),
    };
    let flag_uff = Paint::Glyph {
        glyph_id: BLOB,
        paint: Box::new(Paint::Solid {
            palette_index: 0,
            alpha: F2DOT14_ONE,
        }),
    };
    tables::colr_v1(
        version,
        &[(SMILEY, smiley), (FLAG_US, flag_us), (FLAG_UFF, flag_uff)],
    )
}

fn build_font(
    colr: Option<BeBuffer>,
    gsub: Option<BeBuffer>,
    os2: Option<BeBuffer>,
) -> Vec<u8> {
    use glyphs::*;
    let outlines: Vec<Option<BeBuffer>> = (0..COUNT)
        .map(|gid| match gid {
            NOTDEF => None,
            BLOB => Some(tables::simple_glyph(&[&BLOB_CONTOUR])),
            _ => Some(tables::simple_glyph(&[&SQUARE_CONTOUR])),
        })
        .collect();
    let (glyf, loca) = tables::glyf_loca(&outlines);
    let metrics: Vec<(u16, i16)> = (0..COUNT)
        .map(|gid| (ADVANCE_WIDTH, if gid == NOTDEF { 0 } else { 100 }))
        .collect();
    let cmap = tables::cmap12(&[
        (chars::SMILEY, SMILEY),
        (chars::LETTER_A, LETTER_A),
        (chars::REGIONAL_U, REGIONAL_U),
        (chars::REGIONAL_S, REGIONAL_S),
        (chars::REGIONAL_F, REGIONAL_F),
    ]);

    let mut builder = FontBuilder::new();
    builder
        .add_raw(
            Tag::new(b"head"),
            tables::head(
                UNITS_PER_EM,
                [0, DESCENDER, ADVANCE_WIDTH as i16, ASCENDER],
            )
            .into_vec(),
        )
        .add_raw(Tag::new(b"maxp"), tables::maxp(COUNT, 4, 1).into_vec())
        .add_raw(
            Tag::new(b"hhea"),
            tables::hhea(ASCENDER, DESCENDER, ADVANCE_WIDTH, COUNT).into_vec(),
        )
        .add_raw(Tag::new(b"hmtx"), tables::hmtx(&metrics).into_vec())
        .add_raw(Tag::new(b"glyf"), glyf.into_vec())
        .add_raw(Tag::new(b"loca"), loca.into_vec())
        .add_raw(Tag::new(b"cmap"), cmap.into_vec())
        .add_raw(Tag::new(b"CPAL"), tables::cpal(&PALETTE).into_vec());
    if let Some(colr) = colr {
        builder.add_raw(Tag::new(b"COLR"), colr.into_vec());
    }
    if let Some(gsub) = gsub {
        builder.add_raw(Tag::new(b"GSUB"), gsub.into_vec());
    }
    if let Some(os2) = os2 {
        builder.add_raw(Tag::new(b"OS/2"), os2.into_vec());
    }
    builder.build()
}
