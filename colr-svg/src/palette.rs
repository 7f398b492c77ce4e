//! CPAL colors.

use std::fmt;

use skrifa::raw::{ReadError, TableProvider};

use crate::svg::{fmt_num, Element};

/// Palette index that selects the text foreground color.
pub const FOREGROUND_PALETTE_INDEX: u16 = 0xFFFF;

/// An RGBA color from the CPAL table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Color = Color {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0xFF,
    };
}

/// Formats as `#rrggbb`; alpha is carried separately as an opacity.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// The first palette of a font.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Loads palette 0 from the CPAL table.
    ///
    /// A font without CPAL has an empty palette.
    pub fn new<'a>(font: &impl TableProvider<'a>) -> Result<Self, ReadError> {
        let cpal = match font.cpal() {
            Ok(cpal) => cpal,
            Err(ReadError::TableIsMissing(_)) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        let first = cpal
            .color_record_indices()
            .first()
            .map(|ix| ix.get() as usize)
            .unwrap_or_default();
        let records = match cpal.color_records_array() {
            Some(records) => records?,
            None => &[],
        };
        let colors = records
            .iter()
            .skip(first)
            .take(cpal.num_palette_entries() as usize)
            .map(|record| Color {
                red: record.red(),
                green: record.green(),
                blue: record.blue(),
                alpha: record.alpha(),
            })
            .collect();
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }

    /// Resolves a palette reference with an additional alpha multiplier.
    ///
    /// The foreground index becomes `currentColor`. Indices past the end of
    /// the palette fall back to black.
    pub(crate) fn fill(&self, index: u16, alpha: f32) -> Fill {
        if index == FOREGROUND_PALETTE_INDEX {
            return Fill::new("currentColor", alpha as f64);
        }
        let color = self.get(index).unwrap_or_else(|| {
            log::warn!("palette index {index} out of range, using black");
            Color::BLACK
        });
        Fill::new(color.to_string(), color.alpha as f64 / 255.0 * alpha as f64)
    }
}

/// A resolved paint value, such as a color or a gradient reference, and
/// its opacity.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Fill {
    pub paint: String,
    pub opacity: f64,
}

impl Fill {
    pub(crate) fn new(paint: impl Into<String>, opacity: f64) -> Self {
        Self {
            paint: paint.into(),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Sets the paint and opacity attributes, omitting a fully opaque opacity.
    pub(crate) fn apply(&self, element: &mut Element, paint_attr: &str, opacity_attr: &str) {
        element.set_attr(paint_attr, self.paint.as_str());
        if self.opacity < 1.0 {
            element.set_attr(opacity_attr, fmt_num(self.opacity));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skrifa::FontRef;

    use super::*;

    #[test]
    fn loads_first_palette() {
        let data = colr_test_data::colr_v0();
        let font = FontRef::new(&data).unwrap();
        let palette = Palette::new(&font).unwrap();
        assert_eq!(palette.len(), colr_test_data::PALETTE.len());
        assert_eq!(palette.get(0).unwrap().to_string(), "#ff0000");
        assert_eq!(palette.get(1).unwrap().to_string(), "#0000ff");
        assert_eq!(
            palette.get(2),
            Some(Color {
                red: 0,
                green: 0xFF,
                blue: 0,
                alpha: 0x80
            })
        );
    }

    #[test]
    fn resolve_fills() {
        let data = colr_test_data::colr_v0();
        let font = FontRef::new(&data).unwrap();
        let palette = Palette::new(&font).unwrap();
        assert_eq!(palette.fill(0, 1.0), Fill::new("#ff0000", 1.0));
        assert_eq!(palette.fill(1, 0.5), Fill::new("#0000ff", 0.5));
        assert_eq!(
            palette.fill(FOREGROUND_PALETTE_INDEX, 1.0),
            Fill::new("currentColor", 1.0)
        );
        assert_eq!(palette.fill(42, 1.0), Fill::new("#000000", 1.0));
        let translucent = palette.fill(2, 1.0);
        assert!((translucent.opacity - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn opaque_fill_omits_opacity() {
        let mut element = Element::new("path");
        Fill::new("#ff0000", 1.0).apply(&mut element, "fill", "fill-opacity");
        assert_eq!(element.to_string(), r##"<path fill="#ff0000"/>"##);
        let mut element = Element::new("path");
        Fill::new("#ff0000", 0.5).apply(&mut element, "fill", "fill-opacity");
        assert_eq!(
            element.to_string(),
            r##"<path fill="#ff0000" fill-opacity="0.5"/>"##
        );
    }
}
