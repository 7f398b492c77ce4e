//! Building SVG path data from glyph outlines.

use kurbo::{Affine, Point};
use skrifa::{
    instance::{LocationRef, Size},
    outline::{
        pen::{OutlinePen, SvgPen},
        DrawError, DrawSettings, OutlineGlyph,
    },
};

/// A pen that applies an affine transform to every point before forwarding
/// it to another pen.
pub struct TransformPen<'a, P> {
    inner: &'a mut P,
    transform: Affine,
}

impl<'a, P: OutlinePen> TransformPen<'a, P> {
    pub fn new(inner: &'a mut P, transform: Affine) -> Self {
        Self { inner, transform }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.transform * Point::new(x as f64, y as f64);
        // adding zero turns -0 into 0
        (p.x as f32 + 0.0, p.y as f32 + 0.0)
    }
}

impl<P: OutlinePen> OutlinePen for TransformPen<'_, P> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.inner.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.inner.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.map(cx0, cy0);
        let (x, y) = self.map(x, y);
        self.inner.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.map(cx0, cy0);
        let (cx1, cy1) = self.map(cx1, cy1);
        let (x, y) = self.map(x, y);
        self.inner.curve_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// Produces the `d` attribute for a glyph outline.
///
/// This is the hook for customizing how outlines become paths, for example
/// to apply hinting or a different number format.
pub trait PathBuilder {
    /// Draws `outline` in font units with `transform` applied to every point.
    fn build_path(&self, outline: &OutlineGlyph, transform: Affine) -> Result<String, DrawError>;
}

/// The default [`PathBuilder`].
///
/// Draws unhinted outlines at the default location, using absolute
/// `M`/`L`/`Q`/`C`/`Z` commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgPathBuilder {
    precision: Option<usize>,
}

impl SvgPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits coordinates to the given number of fractional digits.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            precision: Some(precision),
        }
    }
}

impl PathBuilder for SvgPathBuilder {
    fn build_path(&self, outline: &OutlineGlyph, transform: Affine) -> Result<String, DrawError> {
        let mut svg = match self.precision {
            Some(precision) => SvgPen::with_precision(precision),
            None => SvgPen::new(),
        };
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        outline.draw(settings, &mut TransformPen::new(&mut svg, transform))?;
        Ok(svg.into())
    }
}
