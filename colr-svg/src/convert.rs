//! Glyph to SVG conversion for each COLR version.

use std::ops::Range;

use kurbo::Affine;
use skrifa::{
    color::ColorGlyph, instance::LocationRef, outline::OutlineGlyphCollection,
    raw::tables::colr::Colr, GlyphId,
};

use crate::{
    paint::SvgPainter,
    palette::Palette,
    pen::PathBuilder,
    svg::{Element, SVG_NS},
    Error, ViewBox,
};

/// Everything needed to draw one color glyph.
pub(crate) struct GlyphContext<'a, 'f> {
    pub outlines: &'a OutlineGlyphCollection<'f>,
    pub palette: &'a Palette,
    pub path_builder: &'a dyn PathBuilder,
    pub view_box: ViewBox,
    /// Maps font units to the SVG user space of the root element.
    pub transform: Affine,
}

impl GlyphContext<'_, '_> {
    /// Path data for an outline glyph, in root SVG coordinates.
    pub fn path_data(&self, glyph_id: GlyphId) -> Result<String, Error> {
        let outline = self
            .outlines
            .get(glyph_id)
            .ok_or(Error::MissingOutline(glyph_id))?;
        self.path_builder
            .build_path(&outline, self.transform)
            .map_err(|inner| Error::Draw { glyph_id, inner })
    }

    pub fn svg_root(&self) -> Element {
        Element::new("svg")
            .with_attr("xmlns", SVG_NS)
            .with_attr("viewBox", self.view_box.to_string())
    }
}

/// Draws a COLRv0 glyph: one filled path per layer, bottom layer first.
pub(crate) fn colr_v0_glyph_to_svg(
    ctx: &GlyphContext,
    colr: &Colr,
    layers: Range<usize>,
) -> Result<Element, Error> {
    let mut svg = ctx.svg_root().with_child(Element::new("defs"));
    for layer_index in layers {
        let (glyph_id, palette_index) = colr.v0_layer(layer_index)?;
        let glyph_id = GlyphId::from(glyph_id);
        let mut path = Element::new("path").with_attr("d", ctx.path_data(glyph_id)?);
        ctx.palette
            .fill(palette_index, 1.0)
            .apply(&mut path, "fill", "fill-opacity");
        svg.push(path);
    }
    Ok(svg)
}

/// Draws a COLRv1 glyph by walking its paint graph.
pub(crate) fn colr_v1_glyph_to_svg(
    ctx: &GlyphContext,
    glyph: &ColorGlyph,
) -> Result<Element, Error> {
    let mut painter = SvgPainter::new(ctx);
    glyph
        .paint(LocationRef::default(), &mut painter)
        .map_err(Error::Paint)?;
    painter.finish()
}
