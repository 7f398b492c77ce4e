//! A [`ColorPainter`] that builds an SVG element tree.
//!
//! Paint operations arrive in font units with y pointing up. Every group we
//! open records the transform from its own user space to the root SVG user
//! space so that fills can be sized to cover the whole view box and font
//! space transforms can be conjugated into SVG space.

use kurbo::{Affine, Point as KurboPoint};
use skrifa::{
    color::{Brush, ColorPainter, ColorStop, CompositeMode, Extend, Transform},
    raw::types::{BoundingBox, Point},
    GlyphId,
};

use crate::{
    convert::GlyphContext,
    palette::Fill,
    svg::{fmt_num, Element},
    Error,
};

struct Group {
    element: Element,
    /// From this group's user space to the root.
    transform: Affine,
}

pub(crate) struct SvgPainter<'a, 'f> {
    ctx: &'a GlyphContext<'a, 'f>,
    defs: Element,
    // never empty, the root svg element is at the bottom
    stack: Vec<Group>,
    last_id: usize,
    error: Option<Error>,
}

impl<'a, 'f> SvgPainter<'a, 'f> {
    pub fn new(ctx: &'a GlyphContext<'a, 'f>) -> Self {
        Self {
            ctx,
            defs: Element::new("defs"),
            stack: vec![Group {
                element: ctx.svg_root(),
                transform: Affine::IDENTITY,
            }],
            last_id: 0,
            error: None,
        }
    }

    /// Closes any open groups and returns the root element with `<defs>` as
    /// its first child.
    pub fn finish(mut self) -> Result<Element, Error> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        while self.stack.len() > 1 {
            self.pop_group();
        }
        let mut svg = match self.stack.pop() {
            Some(root) => root.element,
            None => self.ctx.svg_root(),
        };
        svg.children_mut().insert(0, self.defs);
        Ok(svg)
    }

    fn current_transform(&self) -> Affine {
        self.stack
            .last()
            .map(|group| group.transform)
            .unwrap_or_default()
    }

    fn push_element(&mut self, element: Element) {
        if let Some(group) = self.stack.last_mut() {
            group.element.push(element);
        }
    }

    fn push_group(&mut self, element: Element, transform: Affine) {
        self.stack.push(Group { element, transform });
    }

    fn pop_group(&mut self) {
        if self.stack.len() < 2 {
            log::warn!("unbalanced pop in paint graph");
            return;
        }
        if let Some(group) = self.stack.pop() {
            self.push_element(group.element);
        }
    }

    fn record_error(&mut self, error: Error) {
        self.error.get_or_insert(error);
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.last_id += 1;
        format!("{prefix}{}", self.last_id)
    }

    /// Conjugates a font space transform into root SVG space.
    fn svg_transform(&self, transform: Transform) -> Affine {
        let font_to_svg = self.ctx.transform;
        font_to_svg * to_affine(transform) * font_to_svg.inverse()
    }

    fn map_point(&self, point: Point<f32>) -> KurboPoint {
        self.ctx.transform * KurboPoint::new(point.x as f64, point.y as f64)
    }

    fn push_clip(&mut self, clip: Element) {
        let id = self.next_id("clip");
        self.defs.push(
            Element::new("clipPath")
                .with_attr("id", id.as_str())
                .with_child(clip),
        );
        let transform = self.current_transform();
        self.push_group(
            Element::new("g").with_attr("clip-path", format!("url(#{id})")),
            transform,
        );
    }

    /// Resolves a brush to a fill, adding gradient definitions as needed.
    fn brush_fill(&mut self, brush: Brush, brush_transform: Option<Transform>) -> Fill {
        match brush {
            Brush::Solid {
                palette_index,
                alpha,
            } => self.ctx.palette.fill(palette_index, alpha),
            Brush::LinearGradient {
                p0,
                p1,
                color_stops,
                extend,
            } => {
                let (p0, p1) = (self.map_point(p0), self.map_point(p1));
                let gradient = Element::new("linearGradient")
                    .with_attr("x1", fmt_num(p0.x))
                    .with_attr("y1", fmt_num(p0.y))
                    .with_attr("x2", fmt_num(p1.x))
                    .with_attr("y2", fmt_num(p1.y));
                self.add_gradient(gradient, color_stops, extend, brush_transform)
            }
            Brush::RadialGradient {
                c0,
                r0,
                c1,
                r1,
                color_stops,
                extend,
            } => {
                let radius_scale = self.ctx.transform.determinant().abs().sqrt();
                let (c0, c1) = (self.map_point(c0), self.map_point(c1));
                let gradient = Element::new("radialGradient")
                    .with_attr("fx", fmt_num(c0.x))
                    .with_attr("fy", fmt_num(c0.y))
                    .with_attr("fr", fmt_num(r0 as f64 * radius_scale))
                    .with_attr("cx", fmt_num(c1.x))
                    .with_attr("cy", fmt_num(c1.y))
                    .with_attr("r", fmt_num(r1 as f64 * radius_scale));
                self.add_gradient(gradient, color_stops, extend, brush_transform)
            }
            Brush::SweepGradient { color_stops, .. } => {
                log::warn!("SVG has no sweep gradient, filling with the first stop color");
                match color_stops.first() {
                    Some(stop) => self.ctx.palette.fill(stop.palette_index, stop.alpha),
                    None => Fill::new("none", 1.0),
                }
            }
        }
    }

    fn add_gradient(
        &mut self,
        mut gradient: Element,
        color_stops: &[ColorStop],
        extend: Extend,
        brush_transform: Option<Transform>,
    ) -> Fill {
        let id = self.next_id("gradient");
        gradient.set_attr("id", id.as_str());
        gradient.set_attr("gradientUnits", "userSpaceOnUse");
        gradient.set_attr("spreadMethod", spread_method(extend));
        if let Some(transform) = brush_transform {
            gradient.set_attr("gradientTransform", matrix(self.svg_transform(transform)));
        }
        for stop in color_stops {
            let mut element = Element::new("stop").with_attr("offset", fmt_num(stop.offset as f64));
            self.ctx
                .palette
                .fill(stop.palette_index, stop.alpha)
                .apply(&mut element, "stop-color", "stop-opacity");
            gradient.push(element);
        }
        self.defs.push(gradient);
        Fill::new(format!("url(#{id})"), 1.0)
    }
}

impl ColorPainter for SvgPainter<'_, '_> {
    fn push_transform(&mut self, transform: Transform) {
        let svg_transform = self.svg_transform(transform);
        let cumulative = self.current_transform() * svg_transform;
        self.push_group(
            Element::new("g").with_attr("transform", matrix(svg_transform)),
            cumulative,
        );
    }

    fn pop_transform(&mut self) {
        self.pop_group();
    }

    fn push_clip_glyph(&mut self, glyph_id: GlyphId) {
        match self.ctx.path_data(glyph_id) {
            Ok(d) => self.push_clip(Element::new("path").with_attr("d", d)),
            Err(e) => {
                self.record_error(e);
                // keep pushes and pops balanced
                let transform = self.current_transform();
                self.push_group(Element::new("g"), transform);
            }
        }
    }

    fn push_clip_box(&mut self, clip_box: BoundingBox<f32>) {
        let rect = self.ctx.transform.transform_rect_bbox(kurbo::Rect::new(
            clip_box.x_min as f64,
            clip_box.y_min as f64,
            clip_box.x_max as f64,
            clip_box.y_max as f64,
        ));
        self.push_clip(
            Element::new("rect")
                .with_attr("x", fmt_num(rect.x0))
                .with_attr("y", fmt_num(rect.y0))
                .with_attr("width", fmt_num(rect.width()))
                .with_attr("height", fmt_num(rect.height())),
        );
    }

    fn pop_clip(&mut self) {
        self.pop_group();
    }

    fn fill(&mut self, brush: Brush<'_>) {
        let transform = self.current_transform();
        if transform.determinant() == 0.0 {
            return;
        }
        // cover the whole view box, expressed in the current user space
        let area = transform
            .inverse()
            .transform_rect_bbox(self.ctx.view_box.to_rect());
        let mut rect = Element::new("rect")
            .with_attr("x", fmt_num(area.x0))
            .with_attr("y", fmt_num(area.y0))
            .with_attr("width", fmt_num(area.width()))
            .with_attr("height", fmt_num(area.height()));
        self.brush_fill(brush, None)
            .apply(&mut rect, "fill", "fill-opacity");
        self.push_element(rect);
    }

    fn fill_glyph(&mut self, glyph_id: GlyphId, brush_transform: Option<Transform>, brush: Brush) {
        let d = match self.ctx.path_data(glyph_id) {
            Ok(d) => d,
            Err(e) => return self.record_error(e),
        };
        let mut path = Element::new("path").with_attr("d", d);
        self.brush_fill(brush, brush_transform)
            .apply(&mut path, "fill", "fill-opacity");
        self.push_element(path);
    }

    fn push_layer(&mut self, composite_mode: CompositeMode) {
        let mut group = Element::new("g");
        match blend_mode(composite_mode) {
            Some(mode) => group.set_attr("style", format!("mix-blend-mode:{mode}")),
            None if composite_mode == CompositeMode::SrcOver => (),
            None => log::warn!("composite mode {composite_mode:?} has no SVG equivalent"),
        }
        let transform = self.current_transform();
        self.push_group(group, transform);
    }

    fn pop_layer(&mut self) {
        self.pop_group();
    }
}

fn to_affine(transform: Transform) -> Affine {
    Affine::new([
        transform.xx as f64,
        transform.yx as f64,
        transform.xy as f64,
        transform.yy as f64,
        transform.dx as f64,
        transform.dy as f64,
    ])
}

fn matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs().map(fmt_num);
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn spread_method(extend: Extend) -> &'static str {
    match extend {
        Extend::Repeat => "repeat",
        Extend::Reflect => "reflect",
        _ => "pad",
    }
}

/// The CSS blend mode for a composite mode, if there is one.
fn blend_mode(mode: CompositeMode) -> Option<&'static str> {
    Some(match mode {
        CompositeMode::Multiply => "multiply",
        CompositeMode::Screen => "screen",
        CompositeMode::Overlay => "overlay",
        CompositeMode::Darken => "darken",
        CompositeMode::Lighten => "lighten",
        CompositeMode::ColorDodge => "color-dodge",
        CompositeMode::ColorBurn => "color-burn",
        CompositeMode::HardLight => "hard-light",
        CompositeMode::SoftLight => "soft-light",
        CompositeMode::Difference => "difference",
        CompositeMode::Exclusion => "exclusion",
        CompositeMode::HslHue => "hue",
        CompositeMode::HslSaturation => "saturation",
        CompositeMode::HslColor => "color",
        CompositeMode::HslLuminosity => "luminosity",
        _ => return None,
    })
}
