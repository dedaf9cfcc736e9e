//! Diagram nodes and their runtime state.

use std::sync::Mutex;

use flowkit_core::{
    config::{NodeConfig, NodeShape, NodeStyle, NodeType},
    geometry::Point,
};

/// Mutable per-node runtime state, owned exclusively by this node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    pub highlighted: bool,
    /// Highlight color override; the style color is used when `None`.
    pub highlight_color: Option<String>,
    pub glow: bool,
}

/// A diagram node: immutable config plus runtime highlight state.
#[derive(Debug)]
pub struct Node {
    config: NodeConfig,
    state: Mutex<NodeState>,
}

impl Node {
    pub(crate) fn new(config: NodeConfig) -> Self {
        Self {
            config,
            state: Mutex::new(NodeState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn node_type(&self) -> NodeType {
        self.config.node_type
    }

    pub fn position(&self) -> Point {
        self.config.position
    }

    pub fn section(&self) -> Option<&str> {
        self.config.section.as_deref()
    }

    pub fn style(&self) -> &NodeStyle {
        &self.config.style
    }

    /// Resolved shape for rendering.
    pub fn shape(&self) -> NodeShape {
        self.config.style.shape(self.config.node_type)
    }

    /// Snapshot of the current runtime state.
    pub fn state(&self) -> NodeState {
        self.lock().clone()
    }

    pub(crate) fn set_highlight(&self, color: Option<String>, glow: bool) {
        let mut state = self.lock();
        state.highlighted = true;
        state.highlight_color = color;
        state.glow = glow;
    }

    pub(crate) fn reset_state(&self) {
        *self.lock() = NodeState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NodeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
