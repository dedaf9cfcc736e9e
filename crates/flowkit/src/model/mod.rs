//! The in-memory diagram model.
//!
//! A [`Diagram`] materializes a validated config into queryable entities
//! with O(1) id lookup. Entity configs are immutable after construction;
//! the small mutable runtime state (highlight and animation flags) lives
//! behind a per-entity lock so `parallel` branches writing to disjoint
//! ids never contend.

mod diagram;
mod edge;
mod node;
mod section;

pub use diagram::Diagram;
pub use edge::{Edge, EdgeState};
pub use node::{Node, NodeState};
pub use section::Section;
