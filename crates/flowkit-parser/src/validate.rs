//! Duplicate-id and cross-reference validation over a built config.
//!
//! Runs after schema validation so it can work with typed entities.
//! Like the schema walk, every problem is collected; nothing stops at
//! the first hit.

use std::collections::{HashMap, HashSet};

use flowkit_core::config::{ActionKind, DiagramConfig, StepConfig};

use crate::error::{Keyword, ValidationIssue};

pub(crate) fn validate_unique_ids(config: &DiagramConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_unique(
        "node",
        "/nodes",
        config.nodes.iter().map(|n| n.id.as_str()),
        &mut issues,
    );
    check_unique(
        "edge",
        "/edges",
        config.edges.iter().map(|e| e.id.as_str()),
        &mut issues,
    );
    check_unique(
        "scenario",
        "/scenarios",
        config.scenarios.iter().map(|s| s.id.as_str()),
        &mut issues,
    );
    check_unique(
        "preset",
        "/presets",
        config.presets.iter().map(|p| p.id.as_str()),
        &mut issues,
    );
    check_unique(
        "stat",
        "/stats",
        config.stats.iter().map(|s| s.id.as_str()),
        &mut issues,
    );
    issues
}

fn check_unique<'a>(
    kind: &str,
    path: &str,
    ids: impl Iterator<Item = &'a str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, id) in ids.enumerate() {
        // Empty ids were already reported by the schema walk.
        if id.is_empty() {
            continue;
        }
        match seen.get(id) {
            Some(first) => issues.push(ValidationIssue::new(
                format!("{path}/{index}/id"),
                format!("duplicate {kind} id \"{id}\" (first defined at index {first})"),
                Keyword::UniqueId,
            )),
            None => {
                seen.insert(id, index);
            }
        }
    }
}

pub(crate) fn validate_references(config: &DiagramConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let node_ids: HashSet<&str> = config.nodes.iter().map(|n| n.id.as_str()).collect();
    let section_ids: HashSet<&str> = config
        .canvas
        .sections
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    let scenario_ids: HashSet<&str> = config.scenarios.iter().map(|s| s.id.as_str()).collect();
    let preset_ids: HashSet<&str> = config.presets.iter().map(|p| p.id.as_str()).collect();

    for (index, edge) in config.edges.iter().enumerate() {
        for (key, target) in [("from", &edge.from), ("to", &edge.to)] {
            if !target.is_empty() && !node_ids.contains(target.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("/edges/{index}/{key}"),
                    format!("references unknown node \"{target}\""),
                    Keyword::Reference,
                ));
            }
        }
    }

    for (index, node) in config.nodes.iter().enumerate() {
        if let Some(section) = &node.section {
            if !section_ids.contains(section.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("/nodes/{index}/section"),
                    format!("references unknown section \"{section}\""),
                    Keyword::Reference,
                ));
            }
        }
    }

    for (index, scenario) in config.scenarios.iter().enumerate() {
        check_goto_targets(
            &scenario.steps,
            &format!("/scenarios/{index}/steps"),
            &scenario_ids,
            &mut issues,
        );
    }

    validate_preset_chains(config, &preset_ids, &mut issues);

    if let Some(comparison) = &config.comparison {
        for (index, item) in comparison.items.iter().enumerate() {
            if !item.preset.is_empty() && !preset_ids.contains(item.preset.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("/comparison/items/{index}/preset"),
                    format!("references unknown preset \"{}\"", item.preset),
                    Keyword::Reference,
                ));
            }
        }
    }

    issues
}

/// Walks the step tree through `conditional` and `parallel` nesting so a
/// `goto` buried three levels deep is still a validation-time failure.
fn check_goto_targets(
    steps: &[StepConfig],
    path: &str,
    scenario_ids: &HashSet<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    for (index, step) in steps.iter().enumerate() {
        let step_path = format!("{path}/{index}");
        if step.action == ActionKind::Goto {
            if let Some(target) = &step.scenario {
                if !scenario_ids.contains(target.as_str()) {
                    issues.push(ValidationIssue::new(
                        format!("{step_path}/scenario"),
                        format!("references unknown scenario \"{target}\""),
                        Keyword::Reference,
                    ));
                }
            }
        }
        check_goto_targets(&step.then_steps, &format!("{step_path}/then"), scenario_ids, issues);
        if let Some(else_steps) = &step.else_steps {
            check_goto_targets(else_steps, &format!("{step_path}/else"), scenario_ids, issues);
        }
        check_goto_targets(&step.steps, &format!("{step_path}/steps"), scenario_ids, issues);
    }
}

/// Checks that every `extends` target exists and that no chain loops back
/// on itself.
fn validate_preset_chains(
    config: &DiagramConfig,
    preset_ids: &HashSet<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let parents: HashMap<&str, &str> = config
        .presets
        .iter()
        .filter_map(|p| p.extends.as_deref().map(|parent| (p.id.as_str(), parent)))
        .collect();

    for (index, preset) in config.presets.iter().enumerate() {
        let Some(parent) = preset.extends.as_deref() else {
            continue;
        };
        if !preset_ids.contains(parent) {
            issues.push(ValidationIssue::new(
                format!("/presets/{index}/extends"),
                format!("references unknown preset \"{parent}\""),
                Keyword::Reference,
            ));
            continue;
        }
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(preset.id.as_str());
        let mut current = parent;
        loop {
            if !visited.insert(current) {
                issues.push(ValidationIssue::new(
                    format!("/presets/{index}/extends"),
                    format!("extends chain starting at \"{}\" contains a cycle", preset.id),
                    Keyword::Reference,
                ));
                break;
            }
            match parents.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowkit_core::config::{EdgeConfig, NodeConfig, PresetConfig, ScenarioConfig};

    fn node(id: &str) -> NodeConfig {
        NodeConfig {
            id: id.to_owned(),
            label: id.to_uppercase(),
            ..NodeConfig::default()
        }
    }

    fn edge(id: &str, from: &str, to: &str) -> EdgeConfig {
        EdgeConfig {
            id: id.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            ..EdgeConfig::default()
        }
    }

    #[test]
    fn duplicate_ids_report_first_seen_index() {
        let config = DiagramConfig {
            nodes: vec![node("a"), node("b"), node("a")],
            ..DiagramConfig::default()
        };
        let issues = validate_unique_ids(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/nodes/2/id");
        assert!(issues[0].message.contains("first defined at index 0"));
        assert_eq!(issues[0].keyword, Keyword::UniqueId);
    }

    #[test]
    fn edge_endpoints_must_exist() {
        let config = DiagramConfig {
            nodes: vec![node("a")],
            edges: vec![edge("e1", "a", "missing")],
            ..DiagramConfig::default()
        };
        let issues = validate_references(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/edges/0/to");
    }

    #[test]
    fn nested_goto_targets_are_checked() {
        let steps: Vec<StepConfig> = serde_json::from_value(serde_json::json!([{
            "action": "parallel",
            "steps": [{
                "action": "conditional",
                "then": [{"action": "goto", "scenario": "nowhere"}]
            }]
        }]))
        .unwrap();
        let config = DiagramConfig {
            nodes: vec![node("a")],
            scenarios: vec![ScenarioConfig {
                id: "s".to_owned(),
                steps,
                ..ScenarioConfig::default()
            }],
            ..DiagramConfig::default()
        };
        let issues = validate_references(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/scenarios/0/steps/0/steps/0/then/0/scenario");
    }

    #[test]
    fn extends_cycle_is_reported() {
        let preset = |id: &str, parent: &str| PresetConfig {
            id: id.to_owned(),
            name: id.to_owned(),
            extends: Some(parent.to_owned()),
            ..PresetConfig::default()
        };
        let config = DiagramConfig {
            nodes: vec![node("a")],
            presets: vec![preset("p1", "p2"), preset("p2", "p1")],
            ..DiagramConfig::default()
        };
        let issues = validate_references(&config);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.message.contains("cycle")));
    }

    #[test]
    fn unknown_extends_target_is_a_reference_issue() {
        let config = DiagramConfig {
            nodes: vec![node("a")],
            presets: vec![PresetConfig {
                id: "p".to_owned(),
                name: "P".to_owned(),
                extends: Some("ghost".to_owned()),
                ..PresetConfig::default()
            }],
            ..DiagramConfig::default()
        };
        let issues = validate_references(&config);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("ghost"));
    }
}
