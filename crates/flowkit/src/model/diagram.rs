//! The diagram aggregate.

use indexmap::IndexMap;

use flowkit_core::config::{CanvasConfig, DiagramConfig, ScenarioConfig};

use super::{Edge, Node, Section};

/// A materialized diagram: entities keyed by id, in authoring order.
///
/// Construction assumes a config that already passed validation, so
/// duplicate ids and dangling references cannot occur here.
pub struct Diagram {
    config: DiagramConfig,
    sections: Vec<Section>,
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
}

impl Diagram {
    pub(crate) fn new(config: DiagramConfig) -> Self {
        let sections = config
            .canvas
            .sections
            .iter()
            .cloned()
            .map(Section::new)
            .collect();
        let nodes = config
            .nodes
            .iter()
            .cloned()
            .map(|node| (node.id.clone(), Node::new(node)))
            .collect();
        let edges = config
            .edges
            .iter()
            .cloned()
            .map(|edge| (edge.id.clone(), Edge::new(edge)))
            .collect();
        Self {
            config,
            sections,
            nodes,
            edges,
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.config.canvas
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn scenario(&self, id: &str) -> Option<&ScenarioConfig> {
        self.config.scenarios.iter().find(|s| s.id == id)
    }

    pub fn scenarios(&self) -> &[ScenarioConfig] {
        &self.config.scenarios
    }

    /// Edges incident to a node, in authoring order.
    pub fn edges_for_node(&self, node_id: &str) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| edge.from() == node_id || edge.to() == node_id)
            .collect()
    }

    /// Nodes assigned to a section, in authoring order.
    pub fn nodes_in_section(&self, section_id: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| node.section() == Some(section_id))
            .collect()
    }

    /// Clears all highlight and animation state.
    pub(crate) fn reset_visuals(&self) {
        for node in self.nodes.values() {
            node.reset_state();
        }
        for edge in self.edges.values() {
            edge.reset_state();
        }
    }

    /// Stops in-flight edge animations without touching highlights.
    pub(crate) fn clear_animations(&self) {
        for edge in self.edges.values() {
            edge.end_animation();
        }
    }
}

#[cfg(test)]
mod tests {
    use flowkit_core::config::{EdgeConfig, NodeConfig, SectionConfig};

    use super::*;

    fn diagram() -> Diagram {
        Diagram::new(DiagramConfig {
            version: "1.0".into(),
            canvas: CanvasConfig {
                sections: vec![SectionConfig {
                    id: "top".into(),
                    ..SectionConfig::default()
                }],
                ..CanvasConfig::default()
            },
            nodes: vec![
                NodeConfig {
                    id: "a".into(),
                    section: Some("top".into()),
                    ..NodeConfig::default()
                },
                NodeConfig {
                    id: "b".into(),
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
    fn lookup_and_queries() {
        let diagram = diagram();
        assert!(diagram.node("a").is_some());
        assert!(diagram.node("missing").is_none());
        assert_eq!(diagram.edges_for_node("a").len(), 1);
        assert_eq!(diagram.edges_for_node("b").len(), 1);
        assert_eq!(diagram.nodes_in_section("top").len(), 1);
    }

    #[test]
    fn reset_visuals_clears_all_state() {
        let diagram = diagram();
        diagram.node("a").unwrap().set_highlight(None, false);
        diagram.edge("e1").unwrap().begin_animation(None, None);

        diagram.reset_visuals();
        assert!(!diagram.node("a").unwrap().state().highlighted);
        assert!(!diagram.edge("e1").unwrap().state().animating);
    }
}
