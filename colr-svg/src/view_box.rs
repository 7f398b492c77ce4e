//! SVG view boxes and the mapping from font units into them.

use std::{fmt, str::FromStr};

use kurbo::{Affine, Rect};
use skrifa::{
    instance::{LocationRef, Size},
    raw::TableProvider,
    FontRef, GlyphId, MetadataProvider,
};

use crate::{svg::fmt_num, Error};

/// The `viewBox` of an SVG document.
///
/// Coordinates are in the SVG user space, where y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Returns true if the box has a finite origin and a finite, positive
    /// size.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::DegenerateViewBox {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl FromStr for ViewBox {
    type Err = Error;

    /// Parses four finite numbers separated by whitespace and/or commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedViewBox(s.to_owned());
        let values = s
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        match values.as_slice() {
            [x, y, width, height] => Ok(Self::new(*x, *y, *width, *height)),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            fmt_num(self.x),
            fmt_num(self.y),
            fmt_num(self.width),
            fmt_num(self.height)
        )
    }
}

/// The default region of a glyph, in y-down font units.
///
/// Spans the advance width horizontally (or the right edge of the outline
/// bounds for zero-advance glyphs) and the typographic ascender to the
/// typographic descender of the OS/2 table vertically. Fonts without OS/2
/// use the ascender and descender reported by [`skrifa::metrics::Metrics`].
pub fn glyph_region(font: &FontRef, glyph_id: GlyphId) -> Option<ViewBox> {
    let location = LocationRef::default();
    let glyph_metrics = font.glyph_metrics(Size::unscaled(), location);
    let mut width = glyph_metrics.advance_width(glyph_id)?;
    if width == 0.0 {
        width = glyph_metrics.bounds(glyph_id)?.x_max;
    }
    let (ascent, descent) = match font.os2() {
        Ok(os2) => (os2.s_typo_ascender() as f64, os2.s_typo_descender() as f64),
        Err(_) => {
            let metrics = font.metrics(Size::unscaled(), location);
            (metrics.ascent as f64, metrics.descent as f64)
        }
    };
    Some(ViewBox::new(0.0, -ascent, width as f64, ascent - descent))
}

/// Returns the transform that places `region` of a glyph over `view_box`.
///
/// Font units are y-up, so the y axis is flipped first. When both boxes are
/// equal this is just the flip: `(x, y)` maps to `(x, -y)`.
pub fn font_to_view_box(view_box: &ViewBox, region: &ViewBox) -> Affine {
    let scale_x = view_box.width / region.width;
    let scale_y = view_box.height / region.height;
    Affine::translate((view_box.x, view_box.y))
        * Affine::scale_non_uniform(scale_x, scale_y)
        * Affine::translate((-region.x, -region.y))
        * Affine::FLIP_Y
}
