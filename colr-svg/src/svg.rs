//! A minimal SVG element tree, its serialization and rescaling.

use std::fmt;

use crate::{Error, ViewBox};

/// The SVG namespace, set on every root element we create.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// An SVG element with ordered attributes and child elements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing the value in place if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = &Element> + '_ {
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Parses the `viewBox` attribute.
    pub fn view_box(&self) -> Result<ViewBox, Error> {
        self.attr("viewBox")
            .ok_or_else(|| Error::MalformedViewBox(String::new()))?
            .parse()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{}\"", Escaped(value))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"']) {
            f.write_str(&rest[..pos])?;
            f.write_str(match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                _ => "&quot;",
            })?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}

/// Serializes an element tree as UTF-8 XML.
pub fn to_bytes(svg: &Element) -> Vec<u8> {
    svg.to_string().into_bytes()
}

/// Returns a copy of `svg` that fits in a `size` by `size` square.
///
/// The new view box starts at the origin and keeps the aspect ratio of the
/// old one. The first child (normally `<defs>`) stays where it is and the
/// remaining children are wrapped in a group that undoes the old view box
/// offset and then scales. The scale and translation are written exactly,
/// so very small scales survive serialization.
pub fn scale_to_size(svg: &Element, size: f64) -> Result<Element, Error> {
    let view_box = svg.view_box()?;
    view_box.validate()?;
    if !(size.is_finite() && size > 0.0) {
        return Err(Error::InvalidSize(size));
    }
    let scale = (size / view_box.width).min(size / view_box.height);
    let mut scaled = svg.clone();
    scaled.set_attr(
        "viewBox",
        ViewBox::new(0.0, 0.0, view_box.width * scale, view_box.height * scale).to_string(),
    );
    let mut children = std::mem::take(scaled.children_mut());
    let rest = if children.is_empty() {
        Vec::new()
    } else {
        children.split_off(1)
    };
    let scale = fmt_exact(scale);
    let group = Element::new("g")
        .with_attr(
            "transform",
            format!(
                "scale({scale} {scale}) translate({} {})",
                fmt_exact(-view_box.x),
                fmt_exact(-view_box.y)
            ),
        )
        .with_children(rest);
    children.push(group);
    *scaled.children_mut() = children;
    Ok(scaled)
}

/// Formats a number for an attribute value.
///
/// Rounds to six fractional digits and prints the shortest form, so `1.0`
/// becomes `1` and `-0.0` becomes `0`.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    format!("{}", rounded + 0.0)
}

/// Formats a number in its shortest round-trip form, without `-0`.
fn fmt_exact(value: f64) -> String {
    format!("{}", value + 0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Element {
        Element::new("svg")
            .with_attr("xmlns", SVG_NS)
            .with_attr("viewBox", "10 20 50 100")
            .with_child(Element::new("defs"))
            .with_child(Element::new("path").with_attr("d", "M0,0 L1,1 Z"))
            .with_child(Element::new("path").with_attr("d", "M2,2 L3,3 Z"))
    }

    #[test]
    fn serialize() {
        let svg = Element::new("svg")
            .with_attr("viewBox", "0 0 1 1")
            .with_child(Element::new("defs"))
            .with_child(Element::new("g").with_child(Element::new("rect")));
        assert_eq!(
            svg.to_string(),
            r#"<svg viewBox="0 0 1 1"><defs/><g><rect/></g></svg>"#
        );
        assert_eq!(to_bytes(&svg), svg.to_string().into_bytes());
    }

    #[test]
    fn escape_attributes() {
        let el = Element::new("g").with_attr("data-x", r#"a<b & "c">"#);
        assert_eq!(
            el.to_string(),
            r#"<g data-x="a&lt;b &amp; &quot;c&quot;&gt;"/>"#
        );
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = Element::new("path").with_attr("d", "M0,0").with_attr("fill", "red");
        el.set_attr("d", "M1,1");
        assert_eq!(
            el.attributes().collect::<Vec<_>>(),
            [("d", "M1,1"), ("fill", "red")]
        );
        assert_eq!(el.attr("fill"), Some("red"));
        assert_eq!(el.attr("stroke"), None);
    }

    #[test]
    fn descendants_in_document_order() {
        let svg = Element::new("svg")
            .with_child(Element::new("defs").with_child(Element::new("clipPath")))
            .with_child(Element::new("g").with_child(Element::new("path")));
        let names: Vec<_> = svg.descendants().map(Element::name).collect();
        assert_eq!(names, ["defs", "clipPath", "g", "path"]);
    }

    #[test]
    fn numbers() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(-10.0), "-10");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(60.00000000000001), "60");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn scale_keeps_aspect_ratio() {
        let scaled = scale_to_size(&sample(), 100.0).unwrap();
        assert_eq!(scaled.attr("viewBox"), Some("0 0 50 100"));
        assert_eq!(scaled.children().len(), 2);
        assert_eq!(scaled.children()[0], Element::new("defs"));
        let group = &scaled.children()[1];
        assert_eq!(group.name(), "g");
        assert_eq!(
            group.attr("transform"),
            Some("scale(1 1) translate(-10 -20)")
        );
        assert_eq!(group.children(), &sample().children()[1..]);
    }

    #[test]
    fn scale_up() {
        let svg = sample().with_attr("viewBox", "0 -800 600 1000");
        let scaled = scale_to_size(&svg, 2000.0).unwrap();
        assert_eq!(scaled.attr("viewBox"), Some("0 0 1200 2000"));
        assert_eq!(
            scaled.children()[1].attr("transform"),
            Some("scale(2 2) translate(0 800)")
        );
    }

    #[test]
    fn small_scale_is_not_rounded() {
        let svg = sample().with_attr("viewBox", "0 0 10000000 10000000");
        let scaled = scale_to_size(&svg, 1.0).unwrap();
        assert_eq!(scaled.attr("viewBox"), Some("0 0 1 1"));
        assert_eq!(
            scaled.children()[1].attr("transform"),
            Some("scale(0.0000001 0.0000001) translate(0 0)")
        );

        let svg = sample().with_attr("viewBox", "-0.5 0 3 3");
        let scaled = scale_to_size(&svg, 1.0).unwrap();
        assert_eq!(
            scaled.children()[1].attr("transform"),
            Some("scale(0.3333333333333333 0.3333333333333333) translate(0.5 0)")
        );
    }

    #[test]
    fn scale_does_not_mutate_input() {
        let svg = sample();
        let before = svg.clone();
        let _ = scale_to_size(&svg, 32.0).unwrap();
        assert_eq!(svg, before);
    }

    #[test]
    fn scale_without_children() {
        let svg = Element::new("svg").with_attr("viewBox", "0 0 10 10");
        let scaled = scale_to_size(&svg, 20.0).unwrap();
        assert_eq!(
            scaled.to_string(),
            r#"<svg viewBox="0 0 20 20"><g transform="scale(2 2) translate(0 0)"/></svg>"#
        );
    }

    #[test]
    fn scale_errors() {
        let zero_width = sample().with_attr("viewBox", "10 20 0 100");
        assert!(matches!(
            scale_to_size(&zero_width, 100.0),
            Err(Error::DegenerateViewBox { width, .. }) if width == 0.0
        ));
        let negative = sample().with_attr("viewBox", "0 0 10 -1");
        assert!(matches!(
            scale_to_size(&negative, 100.0),
            Err(Error::DegenerateViewBox { .. })
        ));
        let malformed = sample().with_attr("viewBox", "0 0 10");
        assert!(matches!(
            scale_to_size(&malformed, 100.0),
            Err(Error::MalformedViewBox(_))
        ));
        assert!(matches!(
            scale_to_size(&Element::new("svg"), 100.0),
            Err(Error::MalformedViewBox(_))
        ));
        for size in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                scale_to_size(&sample(), size),
                Err(Error::InvalidSize(_))
            ));
        }
    }
}
