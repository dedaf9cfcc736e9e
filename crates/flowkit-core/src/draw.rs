//! The drawing-backend boundary.
//!
//! The engine never talks to a concrete graphics API. Everything it needs
//! from a backend is the small capability set in [`Surface`]: clear the
//! canvas and draw rectangles, ellipses, lines, and text. Backends (SVG,
//! HTML canvas, a test recorder) implement this trait and receive draw
//! calls in paint order.

use crate::geometry::{Point, Rect};

/// Fill and outline styling for a rectangle or ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    /// Fill color as a CSS color string.
    pub fill: String,
    /// Optional outline stroke.
    pub stroke: Option<StrokeStyle>,
    /// Corner radius; only meaningful for rectangles.
    pub corner_radius: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: "#000000".to_owned(),
            stroke: None,
            corner_radius: 0.0,
            opacity: 1.0,
        }
    }
}

/// Stroke styling for lines and shape outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color as a CSS color string.
    pub color: String,
    pub width: f64,
    /// SVG-style dash array, e.g. `"8 4"`; `None` draws a solid line.
    pub dash: Option<String>,
}

impl StrokeStyle {
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }
}

/// Horizontal text anchoring relative to the draw position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    /// Returns the SVG `text-anchor` attribute value.
    pub fn to_svg_value(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Text styling for labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Text color as a CSS color string.
    pub color: String,
    /// Font size in canvas units.
    pub size: f64,
    pub bold: bool,
    pub anchor: TextAnchor,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "#212529".to_owned(),
            size: 14.0,
            bold: false,
            anchor: TextAnchor::Middle,
        }
    }
}

/// A drawing backend.
///
/// Calls arrive in paint order; later calls paint over earlier ones.
/// Implementations are expected to be infallible once constructed —
/// backend setup failures belong to the caller that builds the surface.
pub trait Surface {
    /// Resets the canvas to the given size and background color.
    fn clear(&mut self, width: f64, height: f64, background: &str);

    fn draw_rect(&mut self, rect: Rect, style: &ShapeStyle);

    fn draw_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64, style: &ShapeStyle);

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle);

    /// Draws a single line of text anchored at `position`.
    fn draw_text(&mut self, position: Point, content: &str, style: &TextStyle);
}
