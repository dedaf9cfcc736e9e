//! Integration tests for the public Player API.
//!
//! These verify that loading, inspection, and rendering work end to end
//! from source text.

use flowkit::{EngineEvent, Error, Player, RunState};

const STRUCTURED_SOURCE: &str = "\
version: 1.0
metadata:
  title: Checkout flow
nodes:
  - id: cart
    label: Cart
    position:
      x: 100
      y: 120
  - id: payments
    label: Payments
    type: database
    position:
      x: 320
      y: 120
edges:
  - id: checkout
    from: cart
    to: payments
    label: charge
scenarios:
  - id: purchase
    name: Purchase
    steps:
      - action: highlight
        nodes:
          - cart
        duration: 1
";

#[test]
fn load_structured_document() {
    let player = Player::load(STRUCTURED_SOURCE).expect("should load");
    assert_eq!(player.diagram().nodes().count(), 2);
    assert_eq!(player.diagram().edges().count(), 1);
    assert_eq!(player.scenarios().len(), 1);
    assert_eq!(player.state(), RunState::Idle);
}

#[test]
fn debug_output_names_the_run_state() {
    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    let rendered = format!("{player:?}");
    assert!(rendered.contains("Player"), "got {rendered}");
    assert!(rendered.contains("Idle"), "got {rendered}");
}

#[test]
fn counts_round_trip_from_source() {
    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    let config = player.diagram().config();
    assert_eq!(config.nodes.len(), player.diagram().nodes().count());
    assert_eq!(config.edges.len(), player.diagram().edges().count());
    assert_eq!(config.scenarios.len(), player.scenarios().len());
}

#[test]
fn invalid_source_is_rejected() {
    let missing_version = r#"{"nodes": [{"id": "a", "label": "A", "position": {"x": 0, "y": 0}}]}"#;
    assert!(matches!(
        Player::load(missing_version),
        Err(Error::Validation(_))
    ));

    let dangling_edge = r#"{
        "version": "1.0",
        "nodes": [{"id": "a", "label": "A", "position": {"x": 0, "y": 0}}],
        "edges": [{"id": "e", "from": "a", "to": "ghost"}]
    }"#;
    let err = Player::load(dangling_edge).unwrap_err();
    assert!(err.to_string().contains("ghost"), "names the bad id: {err}");
}

#[test]
fn render_svg_contains_diagram_content() {
    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    let svg = player.render_svg();
    assert!(svg.contains("<svg"), "output should be an SVG document");
    assert!(svg.contains("</svg>"));
    assert!(svg.contains("\nCart\n</text>"), "node labels are drawn");
    assert!(svg.contains("\ncharge\n</text>"), "edge labels are drawn");
}

#[test]
fn render_reflects_runtime_state() {
    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    let before = player.render_svg();

    player.set_speed(10.0);
    player.run_scenario("purchase").unwrap();
    let after = player.render_svg();

    assert_ne!(before, after, "highlight changes the rendered output");
}

#[test]
fn set_speed_is_clamped() {
    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    player.set_speed(100.0);
    assert_eq!(player.speed(), 10.0);
    player.set_speed(0.0);
    assert_eq!(player.speed(), 0.1);
}

#[test]
fn unsubscribed_callbacks_stop_firing() {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    let player = Player::load(STRUCTURED_SOURCE).unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let id = player.subscribe(move |event| {
        if matches!(event, EngineEvent::StateChange { .. }) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    player.set_speed(10.0);
    player.run_scenario("purchase").unwrap();
    let during = count.load(Ordering::Relaxed);
    assert!(during >= 2, "saw both state transitions");

    assert!(player.unsubscribe(id));
    player.reset();
    player.run_scenario("purchase").unwrap();
    assert_eq!(count.load(Ordering::Relaxed), during);
}

#[test]
fn stats_surface_through_the_player() {
    let source = r#"{
        "version": "1.0",
        "nodes": [{"id": "n", "label": "N", "position": {"x": 0, "y": 0}}],
        "stats": [
            {"id": "sent", "label": "Sent", "format": "bytes", "initialValue": 2048}
        ]
    }"#;
    let player = Player::load(source).unwrap();
    assert_eq!(player.stat("sent"), Some(2048.0));
    assert_eq!(player.format_stat("sent"), "2 KB");
    assert_eq!(player.stats().len(), 1);
}
