//! SVG surface: accumulates painted primitives in an `svg::Document`

use glam::DVec2;
use svg::node::element::{Circle, Line, Rectangle, Text};
use svg::node::Node;
use svg::Document;

use super::render::{Stroke, Surface, TextStyle};

const LINE_HEIGHT: f64 = 1.2;
const BACKGROUND: &str = "#ffffff";

pub struct SvgSurface {
    width: f64,
    height: f64,
    document: Document,
    elements: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            document: blank_document(width, height),
            elements: 0,
        }
    }

    /// Primitives painted since the last clear, background excluded
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Standalone SVG document of everything painted since the last clear
    pub fn finish(&self) -> String {
        self.document.to_string()
    }

    fn push(&mut self, node: impl Into<Box<dyn Node>>) {
        let document = std::mem::replace(&mut self.document, Document::new());
        self.document = document.add(node);
        self.elements += 1;
    }
}

fn blank_document(width: f64, height: f64) -> Document {
    Document::new()
        .set("width", fmt_num(width))
        .set("height", fmt_num(height))
        .set(
            "viewBox",
            format!("0 0 {} {}", fmt_num(width), fmt_num(height)),
        )
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", BACKGROUND),
        )
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.document = blank_document(self.width, self.height);
        self.elements = 0;
    }

    fn circle(&mut self, center: DVec2, radius: f64, stroke: Stroke, fill: Option<&str>) {
        let circle = Circle::new()
            .set("cx", fmt_num(center.x))
            .set("cy", fmt_num(center.y))
            .set("r", fmt_num(radius))
            .set("fill", fill.unwrap_or("none"));
        self.push(circle.stroke(stroke));
    }

    fn line(&mut self, from: DVec2, to: DVec2, stroke: Stroke) {
        let line = Line::new()
            .set("x1", fmt_num(from.x))
            .set("y1", fmt_num(from.y))
            .set("x2", fmt_num(to.x))
            .set("y2", fmt_num(to.y));
        self.push(line.stroke(stroke));
    }

    /// Each line becomes its own `<text>`, the block centred vertically on `at`
    fn text(&mut self, at: DVec2, text: &str, style: TextStyle) {
        let lines: Vec<&str> = text.lines().collect();
        let step = style.size * LINE_HEIGHT;
        let first_y = at.y - (lines.len().saturating_sub(1) as f64) * step / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let mut element = Text::new(*line)
                .set("x", fmt_num(at.x))
                .set("y", fmt_num(first_y + i as f64 * step))
                .set("fill", style.color)
                .set("font-family", "Arial, sans-serif")
                .set("font-size", fmt_num(style.size))
                .set("text-anchor", "middle")
                .set("dominant-baseline", "central");
            if style.bold {
                element = element.set("font-weight", "bold");
            }
            self.push(element);
        }
    }
}

/// Stroke attributes shared by outlined shapes
trait StrokeAttrs: Sized {
    fn stroke(self, stroke: Stroke) -> Self;
}

macro_rules! stroke_attrs {
    ($($element:ty),*) => {
        $(impl StrokeAttrs for $element {
            fn stroke(self, stroke: Stroke) -> Self {
                let element = self
                    .set("stroke", stroke.color)
                    .set("stroke-width", fmt_num(stroke.width));
                if stroke.dashed {
                    element.set("stroke-dasharray", "6 4")
                } else {
                    element
                }
            }
        })*
    };
}

stroke_attrs!(Circle, Line);

/// Two decimals, trailing zeros trimmed
fn fmt_num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn test_number_format() {
        assert_eq!(fmt_num(250.0), "250");
        assert_eq!(fmt_num(12.345), "12.35");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(0.5), "0.5");
    }

    #[test]
    fn test_document() {
        let mut surface = SvgSurface::new(200.0, 100.0);
        surface.circle(dvec2(100.0, 50.0), 40.0, Stroke::solid("#cccccc", 2.0), None);
        surface.line(dvec2(0.0, 0.0), dvec2(10.0, 10.0), Stroke::dashed("#f44336", 1.0));
        surface.text(dvec2(5.0, 5.0), "a < b & 'c'", TextStyle::new("#333333", 10.0, true));
        assert_eq!(surface.element_count(), 3);

        let svg = surface.finish();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 200 100""#));
        assert!(svg.contains("<circle"));
        assert!(svg.contains(r#"r="40""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke-dasharray="6 4""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains("&lt;"));
        assert!(!svg.contains("a < b"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_multiline_text_and_clear() {
        let mut surface = SvgSurface::new(100.0, 100.0);
        surface.text(
            dvec2(50.0, 50.0),
            "Chart Wheel\n(Awaiting)",
            TextStyle::new("#999999", 10.0, false),
        );
        assert_eq!(surface.element_count(), 2);
        let svg = surface.finish();
        assert!(svg.contains(r#"y="44""#));
        assert!(svg.contains(r#"y="56""#));

        surface.clear();
        assert_eq!(surface.element_count(), 0);
        assert!(!surface.finish().contains("Awaiting"));
    }
}
