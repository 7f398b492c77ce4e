//! Encoders for the handful of tables the test fonts need.
//!
//! Each function returns the binary form of one table (or subtable). Layouts
//! follow the OpenType spec; offsets are computed from the lengths of the
//! pieces as they are appended.

use std::collections::BTreeMap;

use crate::be_buffer;
use crate::bebuffer::{BeBuffer, Uint24};

/// F2Dot14 representation of 1.0
pub const F2DOT14_ONE: u16 = 0x4000;

/// <https://learn.microsoft.com/en-us/typography/opentype/spec/head>
pub fn head(units_per_em: u16, bounds: [i16; 4]) -> BeBuffer {
    be_buffer! {
        1_u16,           // majorVersion
        0_u16,           // minorVersion
        0x00010000_u32,  // fontRevision
        0_u32,           // checksumAdjustment
        0x5F0F3CF5_u32,  // magicNumber
        0_u16,           // flags
        units_per_em,    // unitsPerEm
        0_u32, 0_u32,    // created
        0_u32, 0_u32,    // modified
        bounds[0],       // xMin
        bounds[1],       // yMin
        bounds[2],       // xMax
        bounds[3],       // yMax
        0_u16,           // macStyle
        8_u16,           // lowestRecPPEM
        2_i16,           // fontDirectionHint
        1_i16,           // indexToLocFormat, long offsets
        0_i16            // glyphDataFormat
    }
}

/// Version 1.0 maxp.
pub fn maxp(num_glyphs: u16, max_points: u16, max_contours: u16) -> BeBuffer {
    be_buffer! {
        0x00010000_u32,  // version
        num_glyphs,      // numGlyphs
        max_points,      // maxPoints
        max_contours,    // maxContours
        0_u16,           // maxCompositePoints
        0_u16,           // maxCompositeContours
        2_u16,           // maxZones
        0_u16,           // maxTwilightPoints
        0_u16,           // maxStorage
        0_u16,           // maxFunctionDefs
        0_u16,           // maxInstructionDefs
        0_u16,           // maxStackElements
        0_u16,           // maxSizeOfInstructions
        0_u16,           // maxComponentElements
        0_u16            // maxComponentDepth
    }
}

pub fn hhea(ascender: i16, descender: i16, advance_max: u16, num_h_metrics: u16) -> BeBuffer {
    be_buffer! {
        1_u16,                // majorVersion
        0_u16,                // minorVersion
        ascender,             // ascender
        descender,            // descender
        0_i16,                // lineGap
        advance_max,          // advanceWidthMax
        0_i16,                // minLeftSideBearing
        0_i16,                // minRightSideBearing
        advance_max as i16,   // xMaxExtent
        1_i16,                // caretSlopeRise
        0_i16,                // caretSlopeRun
        0_i16,                // caretOffset
        0_i16, 0_i16, 0_i16, 0_i16, // reserved
        0_i16,                // metricDataFormat
        num_h_metrics         // numberOfHMetrics
    }
}

/// One long metric per glyph.
pub fn hmtx(metrics: &[(u16, i16)]) -> BeBuffer {
    metrics
        .iter()
        .fold(BeBuffer::new(), |buf, (advance, lsb)| buf.push(*advance).push(*lsb))
}

/// Version 4 OS/2 with only the vertical metrics filled in.
///
/// `fsSelection` is zero, so USE_TYPO_METRICS is not set.
///
/// <https://learn.microsoft.com/en-us/typography/opentype/spec/os2>
pub fn os2(
    typo_ascender: i16,
    typo_descender: i16,
    win_ascent: u16,
    win_descent: u16,
) -> BeBuffer {
    be_buffer! {
        4_u16,                // version
        0_i16,                // xAvgCharWidth
        400_u16,              // usWeightClass
        5_u16,                // usWidthClass
        0_u16,                // fsType
        0_i16, 0_i16, 0_i16, 0_i16, // ySubscript size and offset
        0_i16, 0_i16, 0_i16, 0_i16, // ySuperscript size and offset
        0_i16, 0_i16,         // yStrikeoutSize, yStrikeoutPosition
        0_i16,                // sFamilyClass
        0_u32, 0_u32, 0_u16,  // panose
        0_u32, 0_u32, 0_u32, 0_u32, // ulUnicodeRange1-4
        0_u32,                // achVendID
        0_u16,                // fsSelection
        0_u16,                // usFirstCharIndex
        0xFFFF_u16,           // usLastCharIndex
        typo_ascender,        // sTypoAscender
        typo_descender,       // sTypoDescender
        0_i16,                // sTypoLineGap
        win_ascent,           // usWinAscent
        win_descent,          // usWinDescent
        0_u32, 0_u32,         // ulCodePageRange1-2
        0_i16,                // sxHeight
        0_i16,                // sCapHeight
        0_u16,                // usDefaultChar
        0_u16,                // usBreakChar
        0_u16                 // usMaxContext
    }
}

/// A point in a glyf contour: `(x, y, on_curve)`.
pub type ContourPoint = (i16, i16, bool);

const ON_CURVE_POINT: u8 = 0x01;

/// Encodes a simple glyph with uncompressed flags and 16-bit deltas.
pub fn simple_glyph(contours: &[&[ContourPoint]]) -> BeBuffer {
    let points = contours.iter().flat_map(|c| c.iter());
    let (x_min, y_min, x_max, y_max) = points.clone().fold(
        (i16::MAX, i16::MAX, i16::MIN, i16::MIN),
        |(x0, y0, x1, y1), &(x, y, _)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    );
    let mut buf = be_buffer! {
        contours.len() as i16,
        x_min, y_min, x_max, y_max
    };
    let mut end = 0u16;
    for contour in contours {
        end += contour.len() as u16;
        buf = buf.push(end - 1);
    }
    // no instructions
    buf = buf.push(0_u16);
    buf = buf.extend(
        points
            .clone()
            .map(|&(_, _, on)| if on { ON_CURVE_POINT } else { 0 }),
    );
    let mut last = 0i16;
    for &(x, _, _) in points.clone() {
        buf = buf.push(x - last);
        last = x;
    }
    last = 0;
    for &(_, y, _) in points {
        buf = buf.push(y - last);
        last = y;
    }
    buf.align_to(4)
}

/// Returns `(glyf, loca)` using long loca offsets; `None` is an empty glyph.
pub fn glyf_loca(glyphs: &[Option<BeBuffer>]) -> (BeBuffer, BeBuffer) {
    let mut glyf = BeBuffer::new();
    let mut loca = be_buffer! { 0_u32 };
    for glyph in glyphs {
        if let Some(data) = glyph {
            glyf = glyf.append(data);
        }
        loca = loca.push(glyf.len() as u32);
    }
    (glyf, loca)
}

/// A cmap with a single format 12 subtable for (3, 10).
pub fn cmap12(mappings: &[(char, u16)]) -> BeBuffer {
    let mut mappings = mappings.to_vec();
    mappings.sort_by_key(|(ch, _)| *ch);
    let num_groups = mappings.len() as u32;
    let mut buf = be_buffer! {
        0_u16,          // version
        1_u16,          // numTables
        3_u16,          // platformID
        10_u16,         // encodingID
        12_u32,         // subtableOffset
        12_u16,         // format
        0_u16,          // reserved
        16 + 12 * num_groups, // length
        0_u32,          // language
        num_groups      // numGroups
    };
    for (ch, gid) in mappings {
        buf = buf.push(ch as u32).push(ch as u32).push(gid as u32);
    }
    buf
}

/// CPAL version 0 with a single palette of `(r, g, b, a)` colors.
pub fn cpal(colors: &[[u8; 4]]) -> BeBuffer {
    let count = colors.len() as u16;
    let buf = be_buffer! {
        0_u16,   // version
        count,   // numPaletteEntries
        1_u16,   // numPalettes
        count,   // numColorRecords
        14_u32,  // colorRecordsArrayOffset
        0_u16    // colorRecordIndices[0]
    };
    colors
        .iter()
        .fold(buf, |buf, [r, g, b, a]| buf.push(*b).push(*g).push(*r).push(*a))
}

/// COLRv0: base glyphs with their `(layer glyph, palette index)` layers.
///
/// Base glyphs must be sorted by glyph id.
pub fn colr_v0(version: u16, base_glyphs: &[(u16, &[(u16, u16)])]) -> BeBuffer {
    let num_base = base_glyphs.len() as u16;
    let num_layers: usize = base_glyphs.iter().map(|(_, layers)| layers.len()).sum();
    let base_offset = 14_u32;
    let layer_offset = base_offset + 6 * num_base as u32;
    let mut buf = be_buffer! {
        version,
        num_base,           // numBaseGlyphRecords
        base_offset,        // baseGlyphRecordsOffset
        layer_offset,       // layerRecordsOffset
        num_layers as u16   // numLayerRecords
    };
    let mut first_layer = 0u16;
    for (gid, layers) in base_glyphs {
        buf = buf.push(*gid).push(first_layer).push(layers.len() as u16);
        first_layer += layers.len() as u16;
    }
    for (gid, palette_index) in base_glyphs.iter().flat_map(|(_, layers)| layers.iter()) {
        buf = buf.push(*gid).push(*palette_index);
    }
    buf
}

/// The subset of COLRv1 paints used by the test fonts.
#[derive(Clone, Debug)]
pub enum Paint {
    /// PaintSolid (format 2); alpha is F2Dot14.
    Solid { palette_index: u16, alpha: u16 },
    /// PaintLinearGradient (format 4) with a pad color line of opaque stops.
    LinearGradient {
        points: [i16; 6],
        stops: Vec<(u16, u16)>,
    },
    /// PaintGlyph (format 10)
    Glyph { glyph_id: u16, paint: Box<Paint> },
    /// PaintTranslate (format 14)
    Translate { dx: i16, dy: i16, paint: Box<Paint> },
}

impl Paint {
    /// Encodes the paint followed directly by its child.
    pub fn encode(&self) -> BeBuffer {
        match self {
            Paint::Solid {
                palette_index,
                alpha,
            } => be_buffer! { 2_u8, *palette_index, *alpha },
            Paint::LinearGradient { points, stops } => {
                let mut buf = be_buffer! { 4_u8, Uint24(16) };
                buf = buf.extend(points.iter().copied());
                // color line
                buf = buf.push(0_u8).push(stops.len() as u16);
                stops.iter().fold(buf, |buf, (offset, palette_index)| {
                    buf.push(*offset).push(*palette_index).push(F2DOT14_ONE)
                })
            }
            Paint::Glyph { glyph_id, paint } => {
                let header = be_buffer! { 10_u8, Uint24(6), *glyph_id };
                header.append(&paint.encode())
            }
            Paint::Translate { dx, dy, paint } => {
                let header = be_buffer! { 14_u8, Uint24(8), *dx, *dy };
                header.append(&paint.encode())
            }
        }
    }
}

/// COLRv1 with only a base glyph list. Base glyphs must be sorted.
pub fn colr_v1(version: u16, base_glyphs: &[(u16, Paint)]) -> BeBuffer {
    let header = be_buffer! {
        version,
        0_u16,   // numBaseGlyphRecords
        0_u32,   // baseGlyphRecordsOffset
        0_u32,   // layerRecordsOffset
        0_u16,   // numLayerRecords
        34_u32,  // baseGlyphListOffset
        0_u32,   // layerListOffset
        0_u32,   // clipListOffset
        0_u32,   // varIndexMapOffset
        0_u32    // itemVariationStoreOffset
    };
    let paints: Vec<_> = base_glyphs.iter().map(|(_, paint)| paint.encode()).collect();
    let mut list = be_buffer! { base_glyphs.len() as u32 };
    let mut offset = 4 + 6 * base_glyphs.len() as u32;
    for ((gid, _), paint) in base_glyphs.iter().zip(&paints) {
        list = list.push(*gid).push(offset);
        offset += paint.len() as u32;
    }
    let list = paints.iter().fold(list, |list, paint| list.append(paint));
    header.append(&list)
}

fn coverage(glyphs: &[u16]) -> BeBuffer {
    let header = be_buffer! { 1_u16, glyphs.len() as u16 };
    header.extend(glyphs.iter().copied())
}

/// A ligature rule: the full component sequence and the resulting glyph.
pub type LigatureRule<'a> = (&'a [u16], u16);

/// LigatureSubstFormat1 built from a list of rules.
pub fn ligature_subst(rules: &[LigatureRule]) -> BeBuffer {
    let mut by_first: BTreeMap<u16, Vec<(&[u16], u16)>> = BTreeMap::new();
    for (components, ligature) in rules {
        let (first, rest) = components.split_first().expect("empty ligature rule");
        by_first.entry(*first).or_default().push((rest, *ligature));
    }
    let sets: Vec<BeBuffer> = by_first
        .values()
        .map(|ligatures| {
            let header_len = 2 + 2 * ligatures.len();
            let tables: Vec<BeBuffer> = ligatures
                .iter()
                .map(|(rest, ligature)| {
                    let header = be_buffer! { *ligature, rest.len() as u16 + 1 };
                    header.extend(rest.iter().copied())
                })
                .collect();
            let mut set = be_buffer! { ligatures.len() as u16 };
            let mut offset = header_len;
            for table in &tables {
                set = set.push(offset as u16);
                offset += table.len();
            }
            tables.iter().fold(set, |set, table| set.append(table))
        })
        .collect();
    let first_glyphs: Vec<u16> = by_first.keys().copied().collect();
    let coverage = coverage(&first_glyphs);
    let header_len = 6 + 2 * sets.len();
    let mut buf = be_buffer! {
        1_u16,                  // substFormat
        header_len as u16,      // coverageOffset
        sets.len() as u16       // ligatureSetCount
    };
    let mut offset = header_len + coverage.len();
    for set in &sets {
        buf = buf.push(offset as u16);
        offset += set.len();
    }
    let buf = buf.append(&coverage);
    sets.iter().fold(buf, |buf, set| buf.append(set))
}

/// SingleSubstFormat1
pub fn single_subst(glyphs: &[u16], delta: i16) -> BeBuffer {
    let header = be_buffer! { 1_u16, 6_u16, delta };
    header.append(&coverage(glyphs))
}

/// ExtensionSubstFormat1 wrapping a subtable of the given type.
pub fn extension(lookup_type: u16, subtable: &BeBuffer) -> BeBuffer {
    let header = be_buffer! { 1_u16, lookup_type, 8_u32 };
    header.append(subtable)
}

pub fn lookup(lookup_type: u16, subtables: &[BeBuffer]) -> BeBuffer {
    let header_len = 6 + 2 * subtables.len();
    let mut buf = be_buffer! { lookup_type, 0_u16, subtables.len() as u16 };
    let mut offset = header_len;
    for subtable in subtables {
        buf = buf.push(offset as u16);
        offset += subtable.len();
    }
    subtables.iter().fold(buf, |buf, sub| buf.append(sub))
}

/// GSUB 1.0 with empty script and feature lists.
pub fn gsub(lookups: &[BeBuffer]) -> BeBuffer {
    let header = be_buffer! {
        1_u16,   // majorVersion
        0_u16,   // minorVersion
        10_u16,  // scriptListOffset
        12_u16,  // featureListOffset
        14_u16,  // lookupListOffset
        0_u16,   // scriptCount
        0_u16    // featureCount
    };
    let mut list = be_buffer! { lookups.len() as u16 };
    let mut offset = 2 + 2 * lookups.len();
    for lookup in lookups {
        list = list.push(offset as u16);
        offset += lookup.len();
    }
    let list = lookups.iter().fold(list, |list, lookup| list.append(lookup));
    header.append(&list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_is_54_bytes() {
        assert_eq!(head(1000, [0, 0, 0, 0]).len(), 54);
    }

    #[test]
    fn fixed_size_tables() {
        assert_eq!(maxp(1, 0, 0).len(), 32);
        assert_eq!(hhea(800, -200, 600, 1).len(), 36);
        assert_eq!(os2(900, -300, 900, 300).len(), 96);
    }

    #[test]
    fn colr_v1_header_is_34_bytes() {
        let colr = colr_v1(1, &[]);
        // header + empty base glyph list count
        assert_eq!(colr.len(), 34 + 4);
    }

    #[test]
    fn simple_glyph_layout() {
        let glyph = simple_glyph(&[&[(0, 0, true), (10, 0, true), (10, 10, true)]]);
        // 10 header + 2 endPts + 2 instruction length + 3 flags + 6 x + 6 y
        // = 29, padded to 32
        assert_eq!(glyph.len(), 32);
        assert_eq!(&glyph[..2], &[0, 1]);
    }

    #[test]
    fn ligature_subst_offsets() {
        let subst = ligature_subst(&[(&[1, 2], 3)]);
        // header (8) + coverage (6) + set (4) + ligature (6)
        assert_eq!(subst.len(), 24);
        // coverage offset
        assert_eq!(&subst[2..4], &[0, 8]);
        // ligature set offset
        assert_eq!(&subst[6..8], &[0, 14]);
    }
}
