//! Diagram edges and their runtime state.

use std::sync::Mutex;

use flowkit_core::config::{EdgeConfig, EdgeStyle};

/// Mutable per-edge runtime state.
///
/// `progress` is owned exclusively by the animation driver while
/// `animating` is set; no other component writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeState {
    pub highlighted: bool,
    pub highlight_color: Option<String>,
    pub animating: bool,
    /// Animation progress in `[0, 1]` along the edge.
    pub progress: f64,
    /// Label carried by the in-flight animation dot.
    pub animation_label: Option<String>,
}

/// A directed edge: immutable config plus runtime animation state.
#[derive(Debug)]
pub struct Edge {
    config: EdgeConfig,
    state: Mutex<EdgeState>,
}

impl Edge {
    pub(crate) fn new(config: EdgeConfig) -> Self {
        Self {
            config,
            state: Mutex::new(EdgeState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn from(&self) -> &str {
        &self.config.from
    }

    pub fn to(&self) -> &str {
        &self.config.to
    }

    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.config.style
    }

    pub fn state(&self) -> EdgeState {
        self.lock().clone()
    }

    pub(crate) fn set_highlight(&self, color: Option<String>) {
        let mut state = self.lock();
        state.highlighted = true;
        state.highlight_color = color;
    }

    pub(crate) fn begin_animation(&self, label: Option<String>, color: Option<String>) {
        let mut state = self.lock();
        state.animating = true;
        state.progress = 0.0;
        state.animation_label = label;
        if color.is_some() {
            state.highlight_color = color;
        }
    }

    pub(crate) fn set_progress(&self, progress: f64) {
        self.lock().progress = progress.clamp(0.0, 1.0);
    }

    pub(crate) fn end_animation(&self) {
        let mut state = self.lock();
        state.animating = false;
        state.progress = 0.0;
        state.animation_label = None;
    }

    pub(crate) fn reset_state(&self) {
        *self.lock() = EdgeState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EdgeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> Edge {
        Edge::new(EdgeConfig {
            id: "e1".into(),
            from: "a".into(),
            to: "b".into(),
            ..EdgeConfig::default()
        })
    }

    #[test]
    fn animation_lifecycle() {
        let edge = edge();
        edge.begin_animation(Some("packet".into()), None);
        assert!(edge.state().animating);

        edge.set_progress(0.5);
        assert_eq!(edge.state().progress, 0.5);
        edge.set_progress(7.0);
        assert_eq!(edge.state().progress, 1.0, "progress is clamped");

        edge.end_animation();
        let state = edge.state();
        assert!(!state.animating);
        assert_eq!(state.progress, 0.0);
        assert!(state.animation_label.is_none());
    }
}
