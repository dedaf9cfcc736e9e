//! Declarative diagram animation engine.
//!
//! `flowkit` turns a textual diagram definition (JSON or a tolerant
//! YAML-like structured format) into an in-memory model and executes
//! animation scenarios over it: highlighting nodes, sweeping dots along
//! edges, branching on expressions, and tracking stats. Consumers
//! observe a run through a typed event stream and render the current
//! state through a drawing-surface trait (an SVG backend is bundled).
//!
//! # Example
//!
//! ```
//! use flowkit::Player;
//!
//! let source = r#"{
//!     "version": "1.0",
//!     "nodes": [
//!         {"id": "web", "label": "Web", "position": {"x": 100, "y": 100}},
//!         {"id": "db", "label": "DB", "position": {"x": 300, "y": 100}}
//!     ],
//!     "edges": [{"id": "e1", "from": "web", "to": "db"}]
//! }"#;
//!
//! let player = Player::load(source)?;
//! assert_eq!(player.diagram().nodes().count(), 2);
//! let svg = player.render_svg();
//! assert!(svg.contains("<svg"));
//! # Ok::<(), flowkit::Error>(())
//! ```

pub mod engine;
mod error;
mod event;
pub mod model;
pub mod render;
mod player;

pub use error::{Error, LimitKind};
pub use event::{EngineEvent, RunState, StepProgress, SubscriptionId};
pub use player::Player;

pub use flowkit_core as core;
pub use flowkit_parser as parser;
