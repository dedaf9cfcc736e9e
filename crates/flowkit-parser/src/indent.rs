//! Best-effort indentation repair.
//!
//! Some embedding contexts strip all leading whitespace from each line
//! while preserving line breaks, which destroys the structured format's
//! block nesting. Because the schema's root keys and their child keys are
//! fixed, most of the nesting can be reconstructed: root keys return to
//! column zero, known child keys indent under their root, list items
//! indent under the nearest list key, and item fields indent two columns
//! past their item.
//!
//! This is a heuristic. The caller only engages it when no line of the
//! document carries indentation; if the repaired text still fails to
//! parse, the original text's parse error is the one surfaced.

const ROOT_KEYS: &[&str] = &[
    "version",
    "metadata",
    "canvas",
    "nodes",
    "edges",
    "scenarios",
    "presets",
    "stats",
    "logging",
    "layout",
    "comparison",
];

/// Root keys whose value is a list of items.
const LIST_ROOT_KEYS: &[&str] = &["nodes", "edges", "scenarios", "presets", "stats"];

/// Root keys whose value is a table of known scalar children.
const TABLE_ROOT_KEYS: &[&str] = &["metadata", "canvas", "logging", "layout", "comparison"];

fn table_children(root: &str) -> &'static [&'static str] {
    match root {
        "metadata" => &["title", "description", "author", "tags"],
        "canvas" => &["width", "height", "background", "sections"],
        "logging" => &["enabled", "maxEntries", "position", "timestampFormat", "styles"],
        "layout" => &["header", "legend", "footer"],
        "comparison" => &["enabled", "title", "items"],
        _ => &[],
    }
}

/// Table children that open a list block of their own.
const TABLE_LIST_KEYS: &[&str] = &["sections", "items"];

/// Step fields that open a nested step list.
const NESTED_LIST_KEYS: &[&str] = &["steps", "then", "else"];

#[derive(Debug, Clone, Copy)]
struct ListCtx {
    item_indent: usize,
    field_indent: usize,
}

/// Rebuilds indentation for a fully flattened document.
///
/// Returns `None` when the text still carries indentation (nothing to
/// repair) or when repair would not change it.
pub(crate) fn repair_indentation(source: &str) -> Option<String> {
    let has_indent = source
        .lines()
        .any(|line| line.starts_with(|c: char| c == ' ' || c == '\t'));
    if has_indent {
        return None;
    }

    let mut out = String::with_capacity(source.len() + source.len() / 4);
    let mut stack: Vec<ListCtx> = Vec::new();
    let mut table: Option<&str> = None;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            out.push_str(trimmed);
            out.push('\n');
            continue;
        }

        let key = leading_key(trimmed);
        let opens_block = trimmed.ends_with(':');

        // A known root key is only taken as one when it opens a block or
        // we are not inside any other block; `nodes: [a]` inside a step is
        // a step field, not the root node list.
        let is_root = key.is_some_and(|k| {
            ROOT_KEYS.contains(&k) && (opens_block || (stack.is_empty() && table.is_none()))
        });

        let indent = if is_root {
            let key = key.unwrap_or_default();
            stack.clear();
            table = None;
            if opens_block {
                if LIST_ROOT_KEYS.contains(&key) {
                    stack.push(ListCtx {
                        item_indent: 2,
                        field_indent: 4,
                    });
                } else if TABLE_ROOT_KEYS.contains(&key) {
                    table = Some(key);
                }
            }
            0
        } else if trimmed == "-" || trimmed.starts_with("- ") {
            stack.last().map(|ctx| ctx.item_indent).unwrap_or(2)
        } else if let Some(key) = key {
            if table.is_some_and(|root| table_children(root).contains(&key)) {
                if opens_block && TABLE_LIST_KEYS.contains(&key) {
                    stack.push(ListCtx {
                        item_indent: 4,
                        field_indent: 6,
                    });
                }
                2
            } else if let Some(ctx) = stack.last().copied() {
                if opens_block && NESTED_LIST_KEYS.contains(&key) {
                    stack.push(ListCtx {
                        item_indent: ctx.field_indent + 2,
                        field_indent: ctx.field_indent + 4,
                    });
                }
                ctx.field_indent
            } else {
                2
            }
        } else {
            // Not a key and not an item; assume it continues the current
            // item's fields.
            stack.last().map(|ctx| ctx.field_indent).unwrap_or(2)
        };

        for _ in 0..indent {
            out.push(' ');
        }
        out.push_str(trimmed);
        out.push('\n');
    }

    if out.trim_end() == source.trim_end() {
        None
    } else {
        Some(out)
    }
}

/// Extracts `key` from a `key:` or `key: value` line; plain keys only.
fn leading_key(line: &str) -> Option<&str> {
    let colon = line.find(':')?;
    let key = &line[..colon];
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentFormat, document};
    use serde_json::json;

    #[test]
    fn repairs_flattened_metadata_and_nodes() {
        let flattened = "\
version: \"1.0\"
metadata:
title: Demo
nodes:
- id: a
label: A
position: {x: 1, y: 2}
- id: b
label: B
position: {x: 3, y: 4}
";
        let repaired = repair_indentation(flattened).expect("should repair");
        let doc = document::parse_document(&repaired, DocumentFormat::Structured)
            .expect("repaired text should parse");
        assert_eq!(doc["metadata"], json!({"title": "Demo"}));
        assert_eq!(doc["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(doc["nodes"][1]["label"], json!("B"));
    }

    #[test]
    fn repairs_flattened_scenario_steps() {
        let flattened = "\
version: \"1.0\"
nodes:
- id: a
label: A
scenarios:
- id: s1
steps:
- action: highlight
nodes: [a]
";
        let repaired = repair_indentation(flattened).expect("should repair");
        let doc = document::parse_document(&repaired, DocumentFormat::Structured)
            .expect("repaired text should parse");
        assert_eq!(doc["scenarios"][0]["id"], json!("s1"));
        assert_eq!(
            doc["scenarios"][0]["steps"][0]["action"],
            json!("highlight")
        );
        assert_eq!(doc["scenarios"][0]["steps"][0]["nodes"], json!(["a"]));
    }

    #[test]
    fn leaves_indented_documents_alone() {
        let source = "version: 1\nmetadata:\n  title: x\n";
        assert!(repair_indentation(source).is_none());
    }

    #[test]
    fn leaves_trivially_flat_documents_alone() {
        assert!(repair_indentation("version: 1\n").is_none());
    }
}
