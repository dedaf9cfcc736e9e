//! SVG drawing backend.

use std::mem;

use svg::Document;
use svg::node::element as svg_element;

use flowkit_core::draw::{ShapeStyle, StrokeStyle, Surface, TextStyle};
use flowkit_core::geometry::{Point, Rect};

const FONT_FAMILY: &str = "system-ui, sans-serif";

/// A [`Surface`] that accumulates draw calls into an SVG document.
pub struct SvgSurface {
    document: Document,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
        }
    }

    /// Serializes the accumulated document.
    pub fn to_svg_string(&self) -> String {
        self.document.to_string()
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    // Element builders consume self, so adding a node swaps the
    // document out and back.
    fn add(&mut self, node: impl svg::Node) {
        let document = mem::replace(&mut self.document, Document::new());
        self.document = document.add(node);
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64, background: &str) {
        self.document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", format!("0 0 {width} {height}"));
        self.add(
            svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", background),
        );
    }

    fn draw_rect(&mut self, rect: Rect, style: &ShapeStyle) {
        let mut element = svg_element::Rectangle::new()
            .set("x", rect.x)
            .set("y", rect.y)
            .set("width", rect.width)
            .set("height", rect.height)
            .set("fill", style.fill.as_str())
            .set("fill-opacity", style.opacity);
        if style.corner_radius > 0.0 {
            element = element.set("rx", style.corner_radius);
        }
        if let Some(stroke) = &style.stroke {
            element = element
                .set("stroke", stroke.color.as_str())
                .set("stroke-width", stroke.width);
        }
        self.add(element);
    }

    fn draw_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64, style: &ShapeStyle) {
        let mut element = svg_element::Ellipse::new()
            .set("cx", center.x)
            .set("cy", center.y)
            .set("rx", radius_x)
            .set("ry", radius_y)
            .set("fill", style.fill.as_str())
            .set("fill-opacity", style.opacity);
        if let Some(stroke) = &style.stroke {
            element = element
                .set("stroke", stroke.color.as_str())
                .set("stroke-width", stroke.width);
        }
        self.add(element);
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        let mut element = svg_element::Line::new()
            .set("x1", from.x)
            .set("y1", from.y)
            .set("x2", to.x)
            .set("y2", to.y)
            .set("stroke", stroke.color.as_str())
            .set("stroke-width", stroke.width);
        if let Some(dash) = &stroke.dash {
            element = element.set("stroke-dasharray", dash.as_str());
        }
        self.add(element);
    }

    fn draw_text(&mut self, position: Point, content: &str, style: &TextStyle) {
        let mut element = svg_element::Text::new(content)
            .set("x", position.x)
            .set("y", position.y)
            .set("fill", style.color.as_str())
            .set("font-size", style.size)
            .set("font-family", FONT_FAMILY)
            .set("text-anchor", style.anchor.to_svg_value());
        if style.bold {
            element = element.set("font-weight", "bold");
        }
        self.add(element);
    }
}

#[cfg(test)]
mod tests {
    use flowkit_core::draw::TextAnchor;

    use super::*;

    #[test]
    fn clear_resets_previous_content() {
        let mut surface = SvgSurface::new();
        surface.clear(100.0, 50.0, "#ffffff");
        surface.draw_line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            &StrokeStyle::solid("#000000", 1.0),
        );
        surface.clear(100.0, 50.0, "#ffffff");
        assert!(!surface.to_svg_string().contains("<line"));
    }

    #[test]
    fn elements_carry_styling_attributes() {
        let mut surface = SvgSurface::new();
        surface.clear(200.0, 100.0, "#fafafa");
        surface.draw_rect(
            Rect::new(10.0, 10.0, 50.0, 30.0),
            &ShapeStyle {
                fill: "#3b82f6".into(),
                corner_radius: 8.0,
                ..ShapeStyle::default()
            },
        );
        surface.draw_text(
            Point::new(35.0, 25.0),
            "API",
            &TextStyle {
                bold: true,
                anchor: TextAnchor::Middle,
                ..TextStyle::default()
            },
        );

        let output = surface.to_svg_string();
        assert!(output.contains("fill=\"#3b82f6\""));
        assert!(output.contains("rx=\"8\""));
        assert!(output.contains("font-weight=\"bold\""));
        // Text children serialize on their own line.
        assert!(output.contains("\nAPI\n</text>"));
    }

    #[test]
    fn dashed_lines_set_dasharray() {
        let mut surface = SvgSurface::new();
        surface.clear(100.0, 100.0, "#ffffff");
        surface.draw_line(
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            &StrokeStyle {
                color: "#adb5bd".into(),
                width: 3.0,
                dash: Some("8 4".into()),
            },
        );
        assert!(surface.to_svg_string().contains("stroke-dasharray=\"8 4\""));
    }
}
