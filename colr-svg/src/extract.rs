//! Looking up color glyphs and converting them to SVG.

use std::{collections::BTreeMap, fmt, ops::Range};

use skrifa::{
    charmap::Charmap,
    color::{ColorGlyph, ColorGlyphFormat},
    outline::OutlineGlyphCollection,
    raw::{tables::colr::Colr, TableProvider},
    FontRef, GlyphId, MetadataProvider, Tag,
};

use crate::{
    convert::{self, GlyphContext},
    ligature::Ligatures,
    palette::Palette,
    pen::{PathBuilder, SvgPathBuilder},
    svg::Element,
    view_box::{font_to_view_box, glyph_region},
    Error, ViewBox,
};

const COLR: Tag = Tag::new(b"COLR");

/// Computes the view box for a glyph.
pub type ViewBoxFn = dyn Fn(&FontRef, GlyphId) -> Option<ViewBox>;

/// The COLR table versions we can convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColrVersion {
    /// Layers of solid colored glyphs.
    V0,
    /// Paint graphs.
    V1,
}

/// Paint records by base glyph, for one COLR version.
enum GlyphMap<'a> {
    V0(BTreeMap<GlyphId, Range<usize>>),
    V1(BTreeMap<GlyphId, ColorGlyph<'a>>),
}

impl<'a> GlyphMap<'a> {
    fn new(font: &FontRef<'a>, colr: &Colr<'a>, version: ColrVersion) -> Result<Self, Error> {
        Ok(match version {
            ColrVersion::V0 => {
                let records = colr.base_glyph_records().transpose()?.unwrap_or_default();
                GlyphMap::V0(
                    records
                        .iter()
                        .map(|record| {
                            let first = record.first_layer_index() as usize;
                            let end = first + record.num_layers() as usize;
                            (record.glyph_id().into(), first..end)
                        })
                        .collect(),
                )
            }
            ColrVersion::V1 => {
                let color_glyphs = font.color_glyphs();
                let mut map = BTreeMap::new();
                if let Some(list) = colr.base_glyph_list().transpose()? {
                    for record in list.base_glyph_paint_records() {
                        let glyph_id = record.glyph_id().into();
                        if let Some(glyph) =
                            color_glyphs.get_with_format(glyph_id, ColorGlyphFormat::ColrV1)
                        {
                            map.insert(glyph_id, glyph);
                        }
                    }
                }
                GlyphMap::V1(map)
            }
        })
    }

    fn len(&self) -> usize {
        match self {
            GlyphMap::V0(map) => map.len(),
            GlyphMap::V1(map) => map.len(),
        }
    }
}

/// Extracts color glyphs from a font as SVG.
///
/// Construction reads the character map, ligature rules, palette and COLR
/// records once; every later call is a lookup followed by a conversion.
///
/// ```no_run
/// use colr_svg::{svg, ColrSvg};
/// use skrifa::FontRef;
///
/// let data = std::fs::read("NotoColorEmoji.ttf").unwrap();
/// let font = FontRef::new(&data).unwrap();
/// let colr_svg = ColrSvg::new(font).unwrap();
/// let smiley = colr_svg.get("😀").unwrap();
/// let scaled = svg::scale_to_size(&smiley, 128.0).unwrap();
/// std::fs::write("smiley.svg", svg::to_bytes(&scaled)).unwrap();
/// ```
pub struct ColrSvg<'a> {
    font: FontRef<'a>,
    colr: Colr<'a>,
    version: ColrVersion,
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    palette: Palette,
    glyph_map: GlyphMap<'a>,
    ligatures: Ligatures<'a>,
    view_box: Box<ViewBoxFn>,
    path_builder: Box<dyn PathBuilder>,
}

impl<'a> ColrSvg<'a> {
    /// Prepares a font for extraction.
    ///
    /// Fails if the font has no COLR table, or one with a version other
    /// than 0 or 1.
    pub fn new(font: FontRef<'a>) -> Result<Self, Error> {
        let data = font.data_for_tag(COLR).ok_or(Error::MissingColrTable)?;
        let version = match data.read_at::<u16>(0)? {
            0 => ColrVersion::V0,
            1 => ColrVersion::V1,
            other => return Err(Error::UnsupportedColrVersion(other)),
        };
        let colr = font.colr()?;
        let glyph_map = GlyphMap::new(&font, &colr, version)?;
        let ligatures = Ligatures::new(&font)?;
        let palette = Palette::new(&font)?;
        log::debug!(
            "COLR {version:?}: {} color glyphs, {} palette entries, ligatures for {} glyphs",
            glyph_map.len(),
            palette.len(),
            ligatures.table().len()
        );
        Ok(Self {
            charmap: font.charmap(),
            outlines: font.outline_glyphs(),
            font,
            colr,
            version,
            palette,
            glyph_map,
            ligatures,
            view_box: Box::new(glyph_region),
            path_builder: Box::new(SvgPathBuilder::new()),
        })
    }

    /// Replaces the function that picks the view box for each glyph.
    ///
    /// The default is [`glyph_region`]. Glyph outlines are mapped from that
    /// region onto whatever box this function returns.
    pub fn with_view_box(
        mut self,
        view_box: impl Fn(&FontRef, GlyphId) -> Option<ViewBox> + 'static,
    ) -> Self {
        self.view_box = Box::new(view_box);
        self
    }

    /// Replaces the strategy for turning outlines into path data.
    pub fn with_path_builder(mut self, path_builder: impl PathBuilder + 'static) -> Self {
        self.path_builder = Box::new(path_builder);
        self
    }

    pub fn colr_version(&self) -> ColrVersion {
        self.version
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn ligatures(&self) -> &Ligatures<'a> {
        &self.ligatures
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Glyphs that have a color record, in increasing order.
    pub fn color_glyphs(&self) -> impl Iterator<Item = GlyphId> + '_ {
        let ids: Box<dyn Iterator<Item = &GlyphId> + '_> = match &self.glyph_map {
            GlyphMap::V0(map) => Box::new(map.keys()),
            GlyphMap::V1(map) => Box::new(map.keys()),
        };
        ids.copied()
    }

    /// Resolves a character, or a sequence forming a ligature, to a glyph.
    pub fn glyph_id(&self, text: &str) -> Result<GlyphId, Error> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(Error::EmptyInput),
            (Some(ch), None) => self.charmap.map(ch).ok_or(Error::CharacterNotMapped(ch)),
            _ => self
                .ligatures
                .resolve(text)?
                .ok_or_else(|| Error::LigatureNotFound(text.to_owned())),
        }
    }

    /// Returns the SVG for a character or ligature sequence.
    pub fn get(&self, text: &str) -> Result<Element, Error> {
        self.glyph_to_svg(self.glyph_id(text)?)
    }

    /// Returns the SVG for a color glyph.
    pub fn glyph_to_svg(&self, glyph_id: GlyphId) -> Result<Element, Error> {
        match &self.glyph_map {
            GlyphMap::V0(map) => {
                let layers = map
                    .get(&glyph_id)
                    .ok_or(Error::GlyphHasNoColorRecord(glyph_id))?;
                let ctx = self.context(glyph_id)?;
                convert::colr_v0_glyph_to_svg(&ctx, &self.colr, layers.clone())
            }
            GlyphMap::V1(map) => {
                let glyph = map
                    .get(&glyph_id)
                    .ok_or(Error::GlyphHasNoColorRecord(glyph_id))?;
                let ctx = self.context(glyph_id)?;
                convert::colr_v1_glyph_to_svg(&ctx, glyph)
            }
        }
    }

    fn context(&self, glyph_id: GlyphId) -> Result<GlyphContext<'_, 'a>, Error> {
        let view_box = (self.view_box)(&self.font, glyph_id).ok_or(Error::NoViewBox(glyph_id))?;
        view_box.validate()?;
        // outlines are placed relative to the default region, even when the
        // view box comes from elsewhere
        let region = glyph_region(&self.font, glyph_id)
            .filter(ViewBox::is_valid)
            .unwrap_or(view_box);
        Ok(GlyphContext {
            outlines: &self.outlines,
            palette: &self.palette,
            path_builder: self.path_builder.as_ref(),
            view_box,
            transform: font_to_view_box(&view_box, &region),
        })
    }
}

impl fmt::Debug for ColrSvg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColrSvg")
            .field("version", &self.version)
            .field("color_glyphs", &self.glyph_map.len())
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use colr_test_data::{chars, glyphs};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::svg::{scale_to_size, to_bytes};

    fn gid(id: u16) -> GlyphId {
        GlyphId::from(id)
    }

    fn text(chars: &[char]) -> String {
        chars.iter().collect()
    }

    #[test]
    fn versions() {
        let data = colr_test_data::colr_v0();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        assert_eq!(colr_svg.colr_version(), ColrVersion::V0);
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        assert_eq!(colr_svg.colr_version(), ColrVersion::V1);
        assert_eq!(
            colr_svg.color_glyphs().collect::<Vec<_>>(),
            [gid(glyphs::SMILEY), gid(glyphs::FLAG_US), gid(glyphs::FLAG_UFF)]
        );
    }

    #[test]
    fn unsupported_version() {
        let data = colr_test_data::colr_with_version(2);
        let result = ColrSvg::new(FontRef::new(&data).unwrap());
        assert!(matches!(result, Err(Error::UnsupportedColrVersion(2))));
    }

    #[test]
    fn missing_colr() {
        let data = colr_test_data::without_colr();
        let result = ColrSvg::new(FontRef::new(&data).unwrap());
        assert!(matches!(result, Err(Error::MissingColrTable)));
    }

    #[test]
    fn single_character() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        assert_eq!(
            colr_svg.glyph_id(&text(&[chars::SMILEY])).unwrap(),
            gid(glyphs::SMILEY)
        );
        assert!(matches!(
            colr_svg.glyph_id(&text(&[chars::UNMAPPED])),
            Err(Error::CharacterNotMapped(chars::UNMAPPED))
        ));
        assert!(matches!(colr_svg.glyph_id(""), Err(Error::EmptyInput)));
    }

    #[test]
    fn ligature_sequence() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let us = text(&[chars::REGIONAL_U, chars::REGIONAL_S]);
        assert_eq!(colr_svg.glyph_id(&us).unwrap(), gid(glyphs::FLAG_US));
        let uf = text(&[chars::REGIONAL_U, chars::REGIONAL_F]);
        assert!(matches!(
            colr_svg.glyph_id(&uf),
            Err(Error::LigatureNotFound(s)) if s == uf
        ));
        // both ligatures resolve to the same glyph and so the same svg
        let su = text(&[chars::REGIONAL_S, chars::REGIONAL_U]);
        assert_eq!(colr_svg.get(&us).unwrap(), colr_svg.get(&su).unwrap());
    }

    #[test]
    fn no_color_record() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let result = colr_svg.get(&text(&[chars::LETTER_A]));
        assert!(matches!(
            result,
            Err(Error::GlyphHasNoColorRecord(g)) if g == gid(glyphs::LETTER_A)
        ));
        // still usable afterwards
        assert!(colr_svg.get(&text(&[chars::SMILEY])).is_ok());
    }

    #[test]
    fn v0_glyph() {
        let data = colr_test_data::colr_v0();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        assert_eq!(svg.attr("xmlns"), Some(crate::svg::SVG_NS));
        assert_eq!(svg.attr("viewBox"), Some("0 -800 600 1000"));
        let fills: Vec<_> = svg
            .children()
            .iter()
            .map(|child| (child.name(), child.attr("fill")))
            .collect();
        assert_eq!(
            fills,
            [
                ("defs", None),
                ("path", Some("#ff0000")),
                ("path", Some("#0000ff"))
            ]
        );
        let us = text(&[chars::REGIONAL_U, chars::REGIONAL_S]);
        let flag = colr_svg.get(&us).unwrap();
        assert_eq!(flag.children()[1].attr("fill"), Some("#00ff00"));
        assert_eq!(flag.children()[1].attr("fill-opacity"), Some("0.501961"));
        let uff = text(&[chars::REGIONAL_U, chars::REGIONAL_F, chars::REGIONAL_F]);
        let flag = colr_svg.get(&uff).unwrap();
        assert_eq!(flag.children()[1].attr("fill"), Some("currentColor"));
    }

    #[test]
    fn v1_solid_glyph() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let us = text(&[chars::REGIONAL_U, chars::REGIONAL_S]);
        let svg = colr_svg.get(&us).unwrap();
        assert_eq!(svg.children()[0].name(), "defs");
        let path = svg
            .descendants()
            .find(|el| el.name() == "path")
            .unwrap();
        assert_eq!(path.attr("fill"), Some("#0000ff"));
        assert_eq!(path.attr("fill-opacity"), Some("0.5"));
        assert!(path.attr("d").unwrap().starts_with("M100,0 L500,0"));
    }

    #[test]
    fn v1_gradient_glyph() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        let group = svg
            .descendants()
            .find(|el| el.name() == "g")
            .unwrap();
        assert_eq!(group.attr("transform"), Some("matrix(1 0 0 1 10 -20)"));
        let gradient = svg.children()[0]
            .descendants()
            .find(|el| el.name() == "linearGradient")
            .unwrap();
        let colors: Vec<_> = gradient
            .children()
            .iter()
            .map(|stop| stop.attr("stop-color").unwrap())
            .collect();
        assert_eq!(colors, ["#ff0000", "#0000ff"]);
        let id = gradient.attr("id").unwrap();
        let path = svg
            .descendants()
            .find(|el| el.name() == "path")
            .unwrap();
        assert_eq!(path.attr("fill"), Some(format!("url(#{id})").as_str()));
        let d = path.attr("d").unwrap();
        assert!(d.starts_with('M') && d.ends_with('Z'), "{d}");
        assert_eq!(d.matches('Q').count(), 4, "{d}");
    }

    #[test]
    fn serialized_output_is_xml() {
        let data = colr_test_data::colr_v1();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        let scaled = scale_to_size(&svg, 128.0).unwrap();
        let bytes = to_bytes(&scaled);
        let xml = std::str::from_utf8(&bytes).unwrap();
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.tag_name().namespace(), Some(crate::svg::SVG_NS));
        assert_eq!(root.attribute("viewBox"), Some("0 0 76.8 128"));
        assert!(root
            .descendants()
            .any(|node| node.tag_name().name() == "path"));
    }

    #[test]
    fn default_view_box_from_typo_metrics() {
        let data = colr_test_data::with_typo_metrics();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap()).unwrap();
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        assert_eq!(svg.attr("viewBox"), Some("0 -900 600 1200"));
    }

    #[test]
    fn custom_view_box() {
        let data = colr_test_data::colr_v0();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap())
            .unwrap()
            .with_view_box(|_, _| Some(ViewBox::new(0.0, 0.0, 60.0, 100.0)));
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        assert_eq!(svg.attr("viewBox"), Some("0 0 60 100"));
        // the square spans x 100..500 and y 0..700 in font units
        let d = svg.children()[1].attr("d").unwrap();
        assert!(d.starts_with("M10,80 L50,80 L50,10 L10,10"), "{d}");

        let colr_svg = colr_svg.with_view_box(|_, _| None);
        assert!(matches!(
            colr_svg.get(&text(&[chars::SMILEY])),
            Err(Error::NoViewBox(_))
        ));
        let colr_svg = colr_svg.with_view_box(|_, _| Some(ViewBox::new(0.0, 0.0, 0.0, 10.0)));
        assert!(matches!(
            colr_svg.get(&text(&[chars::SMILEY])),
            Err(Error::DegenerateViewBox { .. })
        ));
    }

    #[test]
    fn custom_path_builder() {
        struct Placeholder;

        impl PathBuilder for Placeholder {
            fn build_path(
                &self,
                _outline: &skrifa::outline::OutlineGlyph,
                _transform: kurbo::Affine,
            ) -> Result<String, skrifa::outline::DrawError> {
                Ok("M0,0 Z".into())
            }
        }

        let data = colr_test_data::colr_v0();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap())
            .unwrap()
            .with_path_builder(Placeholder);
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        assert!(svg.children()[1..]
            .iter()
            .all(|path| path.attr("d") == Some("M0,0 Z")));
    }

    #[test]
    fn precision() {
        let data = colr_test_data::colr_v0();
        let colr_svg = ColrSvg::new(FontRef::new(&data).unwrap())
            .unwrap()
            .with_path_builder(SvgPathBuilder::with_precision(1));
        let svg = colr_svg.get(&text(&[chars::SMILEY])).unwrap();
        let d = svg.children()[1].attr("d").unwrap();
        assert!(d.starts_with("M100.0,0.0 L500.0,0.0"), "{d}");
    }
}
