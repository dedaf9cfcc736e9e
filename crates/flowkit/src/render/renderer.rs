//! Model-to-surface drawing.

use flowkit_core::config::NodeShape;
use flowkit_core::draw::{ShapeStyle, StrokeStyle, Surface, TextAnchor, TextStyle};
use flowkit_core::geometry::{Point, Rect};

use crate::model::{Diagram, Edge, Node};

const SECTION_LABEL_COLOR: &str = "#6b7280";
const NODE_LABEL_COLOR: &str = "#ffffff";
const GLOW_OPACITY: f64 = 0.35;
const GLOW_MARGIN: f64 = 8.0;
const ANIMATION_DOT_RADIUS: f64 = 6.0;
const ROUNDED_CORNER_RADIUS: f64 = 8.0;
const CYLINDER_CAP_RATIO: f64 = 0.15;

/// Draws the diagram's current state in paint order.
pub fn draw_diagram(diagram: &Diagram, surface: &mut dyn Surface) {
    let canvas = diagram.canvas();
    surface.clear(canvas.width, canvas.height, &canvas.background);

    for section in diagram.sections() {
        let band = Rect::new(0.0, section.y(), canvas.width, section.height());
        if let Some(background) = &section.style().background {
            surface.draw_rect(
                band,
                &ShapeStyle {
                    fill: background.clone(),
                    ..ShapeStyle::default()
                },
            );
        }
        if let Some(label) = section.label() {
            let color = section
                .style()
                .label_color
                .clone()
                .unwrap_or_else(|| SECTION_LABEL_COLOR.to_owned());
            surface.draw_text(
                Point::new(12.0, section.y() + 20.0),
                label,
                &TextStyle {
                    color,
                    size: 13.0,
                    bold: true,
                    anchor: TextAnchor::Start,
                },
            );
        }
    }

    for edge in diagram.edges() {
        draw_edge(diagram, edge, surface);
    }
    for node in diagram.nodes() {
        draw_node_shape(node, surface);
    }
    for node in diagram.nodes() {
        draw_node_label(node, surface);
    }
}

fn draw_edge(diagram: &Diagram, edge: &Edge, surface: &mut dyn Surface) {
    // Endpoints are validated at parse time, so both nodes exist.
    let (Some(from), Some(to)) = (diagram.node(edge.from()), diagram.node(edge.to())) else {
        return;
    };
    let from = from.position();
    let to = to.position();

    let state = edge.state();
    let color = if state.highlighted || state.animating {
        state
            .highlight_color
            .clone()
            .unwrap_or_else(|| edge.style().color().to_owned())
    } else {
        edge.style().color().to_owned()
    };

    surface.draw_line(
        from,
        to,
        &StrokeStyle {
            color: color.clone(),
            width: edge.style().width(),
            dash: edge.style().line_type.dash_array().map(String::from),
        },
    );

    if let Some(label) = edge.label() {
        let midpoint = from.lerp(to, 0.5);
        surface.draw_text(
            Point::new(midpoint.x, midpoint.y - 10.0),
            label,
            &TextStyle {
                color: SECTION_LABEL_COLOR.to_owned(),
                size: 12.0,
                ..TextStyle::default()
            },
        );
    }

    if state.animating {
        let dot = from.lerp(to, state.progress);
        surface.draw_ellipse(
            dot,
            ANIMATION_DOT_RADIUS,
            ANIMATION_DOT_RADIUS,
            &ShapeStyle {
                fill: color,
                ..ShapeStyle::default()
            },
        );
        if let Some(label) = &state.animation_label {
            surface.draw_text(
                Point::new(dot.x, dot.y - 12.0),
                label,
                &TextStyle {
                    size: 11.0,
                    ..TextStyle::default()
                },
            );
        }
    }
}

fn draw_node_shape(node: &Node, surface: &mut dyn Surface) {
    let style = node.style();
    let state = node.state();
    let width = style.width();
    let height = style.height();
    let bounds = Rect::centered(node.position(), width, height);

    let fill = if state.highlighted {
        state
            .highlight_color
            .clone()
            .unwrap_or_else(|| style.color().to_owned())
    } else {
        style.color().to_owned()
    };

    if state.glow {
        let glow = Rect::centered(
            node.position(),
            width + GLOW_MARGIN * 2.0,
            height + GLOW_MARGIN * 2.0,
        );
        surface.draw_rect(
            glow,
            &ShapeStyle {
                fill: fill.clone(),
                corner_radius: ROUNDED_CORNER_RADIUS + GLOW_MARGIN,
                opacity: GLOW_OPACITY,
                ..ShapeStyle::default()
            },
        );
    }

    let stroke = state
        .highlighted
        .then(|| StrokeStyle::solid("#ffffff", 2.0));
    let shape_style = ShapeStyle {
        fill,
        stroke,
        corner_radius: 0.0,
        opacity: 1.0,
    };

    match node.shape() {
        NodeShape::Rectangle => surface.draw_rect(bounds, &shape_style),
        NodeShape::RoundedRect => surface.draw_rect(
            bounds,
            &ShapeStyle {
                corner_radius: ROUNDED_CORNER_RADIUS,
                ..shape_style
            },
        ),
        NodeShape::Circle => {
            let radius = width.min(height) / 2.0;
            surface.draw_ellipse(node.position(), radius, radius, &shape_style);
        }
        NodeShape::Ellipse => {
            surface.draw_ellipse(node.position(), width / 2.0, height / 2.0, &shape_style);
        }
        NodeShape::Cylinder => {
            let cap = height * CYLINDER_CAP_RATIO;
            let body = Rect::new(bounds.x, bounds.y + cap, width, height - cap * 2.0);
            surface.draw_rect(body, &shape_style);
            surface.draw_ellipse(
                Point::new(node.position().x, bounds.y + bounds.height - cap),
                width / 2.0,
                cap,
                &shape_style,
            );
            surface.draw_ellipse(
                Point::new(node.position().x, bounds.y + cap),
                width / 2.0,
                cap,
                &shape_style,
            );
        }
    }
}

fn draw_node_label(node: &Node, surface: &mut dyn Surface) {
    if node.label().is_empty() {
        return;
    }
    // Vertically centered; the +5 offsets the text baseline.
    surface.draw_text(
        Point::new(node.position().x, node.position().y + 5.0),
        node.label(),
        &TextStyle {
            color: NODE_LABEL_COLOR.to_owned(),
            size: 14.0,
            bold: true,
            anchor: TextAnchor::Middle,
        },
    );
}

#[cfg(test)]
mod tests {
    use flowkit_core::config::{
        CanvasConfig, DiagramConfig, EdgeConfig, NodeConfig, NodeStyle, SectionConfig,
    };

    use super::*;

    /// Records draw calls for assertions.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, width: f64, height: f64, background: &str) {
            self.calls.push(format!("clear {width}x{height} {background}"));
        }

        fn draw_rect(&mut self, rect: Rect, style: &ShapeStyle) {
            self.calls
                .push(format!("rect {},{} {}", rect.x, rect.y, style.fill));
        }

        fn draw_ellipse(&mut self, center: Point, _rx: f64, _ry: f64, style: &ShapeStyle) {
            self.calls
                .push(format!("ellipse {},{} {}", center.x, center.y, style.fill));
        }

        fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
            self.calls.push(format!(
                "line {},{}->{},{} {}",
                from.x, from.y, to.x, to.y, stroke.color
            ));
        }

        fn draw_text(&mut self, _position: Point, content: &str, _style: &TextStyle) {
            self.calls.push(format!("text {content}"));
        }
    }

    fn diagram() -> Diagram {
        Diagram::new(DiagramConfig {
            version: "1.0".into(),
            canvas: CanvasConfig {
                width: 400.0,
                height: 300.0,
                sections: vec![SectionConfig {
                    id: "band".into(),
                    label: Some("Tier".into()),
                    y: 0.0,
                    height: 150.0,
                    ..SectionConfig::default()
                }],
                ..CanvasConfig::default()
            },
            nodes: vec![
                NodeConfig {
                    id: "a".into(),
                    label: "A".into(),
                    position: Point::new(100.0, 100.0),
                    ..NodeConfig::default()
                },
                NodeConfig {
                    id: "b".into(),
                    label: "B".into(),
                    position: Point::new(300.0, 100.0),
                    style: NodeStyle {
                        color: Some("#10b981".into()),
                        ..NodeStyle::default()
                    },
                    ..NodeConfig::default()
                },
            ],
            edges: vec![EdgeConfig {
                id: "e1".into(),
                from: "a".into(),
                to: "b".into(),
                ..EdgeConfig::default()
            }],
            ..DiagramConfig::default()
        })
    }

    #[test]
    fn paint_order_is_background_sections_edges_nodes_labels() {
        let diagram = diagram();
        let mut recorder = Recorder::default();
        draw_diagram(&diagram, &mut recorder);

        let calls = &recorder.calls;
        assert!(calls[0].starts_with("clear 400x300"));
        let edge_pos = calls.iter().position(|c| c.starts_with("line")).unwrap();
        let node_pos = calls.iter().position(|c| c.starts_with("rect")).unwrap();
        let label_pos = calls.iter().position(|c| c == "text A").unwrap();
        assert!(edge_pos < node_pos, "edges paint under nodes");
        assert!(node_pos < label_pos, "labels paint over shapes");
    }

    #[test]
    fn animation_dot_tracks_progress() {
        let diagram = diagram();
        let edge = diagram.edge("e1").unwrap();
        edge.begin_animation(Some("req".into()), Some("#ef4444".into()));
        edge.set_progress(0.5);

        let mut recorder = Recorder::default();
        draw_diagram(&diagram, &mut recorder);

        assert!(
            recorder
                .calls
                .iter()
                .any(|c| c == "ellipse 200,100 #ef4444"),
            "dot drawn at the midpoint in the highlight color: {:?}",
            recorder.calls
        );
        assert!(recorder.calls.iter().any(|c| c == "text req"));
    }

    #[test]
    fn highlight_color_overrides_fill() {
        let diagram = diagram();
        diagram
            .node("a")
            .unwrap()
            .set_highlight(Some("#f59e0b".into()), false);

        let mut recorder = Recorder::default();
        draw_diagram(&diagram, &mut recorder);
        assert!(recorder.calls.iter().any(|c| c.contains("#f59e0b")));
    }
}
