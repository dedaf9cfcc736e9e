//! Schema validation: generic tree to [`DiagramConfig`].
//!
//! The walk never stops at the first problem. Every type mismatch,
//! missing field, bad enum value, and out-of-range number is recorded as
//! a [`ValidationIssue`] with its JSON-pointer path, and the caller
//! rejects the document iff any were recorded. Fields that fail keep
//! their default so the walk can continue past them.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use flowkit_core::{
    config::{
        ActionKind, CanvasConfig, ComparisonConfig, ComparisonItem, DiagramConfig, EdgeConfig,
        Expr, FooterConfig, HeaderConfig, HighlightStyle, LayoutConfig, LegendConfig, LegendItem,
        LineType, LogLevel, LogSpec, LoggingConfig, MetadataConfig, NodeConfig, NodeShape,
        NodeType, PresetConfig, ScenarioConfig, SectionConfig, StatConfig, StatFormat, StepConfig,
    },
    geometry::Point,
};

use crate::error::{Keyword, ValidationIssue};

const KNOWN_ROOT_KEYS: &[&str] = &[
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

type JsonMap = serde_json::Map<String, JsonValue>;

pub(crate) fn build_config(
    root: &JsonValue,
    allow_unknown_fields: bool,
) -> Result<DiagramConfig, Vec<ValidationIssue>> {
    let mut b = SchemaBuilder { issues: Vec::new() };
    let mut config = DiagramConfig::default();

    let Some(obj) = root.as_object() else {
        b.issue("/", "document root must be a mapping", Keyword::Type);
        return Err(b.issues);
    };

    if !allow_unknown_fields {
        for key in obj.keys() {
            if !KNOWN_ROOT_KEYS.contains(&key.as_str()) {
                b.issue(
                    format!("/{key}"),
                    format!("unknown field \"{key}\""),
                    Keyword::AdditionalProperties,
                );
            }
        }
    }

    match obj.get("version") {
        Some(JsonValue::String(s)) => config.version = s.clone(),
        // Bare `version: 1.0` parses as a number; coerce it.
        Some(JsonValue::Number(n)) => config.version = n.to_string(),
        Some(_) => b.issue("/version", "must be a string", Keyword::Type),
        None => b.issue("/version", "missing required field", Keyword::Required),
    }

    if let Some(value) = obj.get("metadata") {
        config.metadata = Some(b.metadata(value, "/metadata"));
    }
    if let Some(value) = obj.get("canvas") {
        config.canvas = b.canvas(value, "/canvas");
    }

    match obj.get("nodes") {
        Some(JsonValue::Array(items)) => {
            if items.is_empty() {
                b.issue("/nodes", "must contain at least one node", Keyword::Minimum);
            }
            config.nodes = b.list(items, "/nodes", SchemaBuilder::node);
        }
        Some(_) => b.issue("/nodes", "must be a list", Keyword::Type),
        None => b.issue("/nodes", "missing required field", Keyword::Required),
    }

    config.edges = b.optional_list(obj, "/edges", "edges", SchemaBuilder::edge);
    config.scenarios = b.optional_list(obj, "/scenarios", "scenarios", SchemaBuilder::scenario);
    config.presets = b.optional_list(obj, "/presets", "presets", SchemaBuilder::preset);
    config.stats = b.optional_list(obj, "/stats", "stats", SchemaBuilder::stat);

    if let Some(value) = obj.get("logging") {
        config.logging = Some(b.logging(value, "/logging"));
    }
    if let Some(value) = obj.get("layout") {
        config.layout = Some(b.layout(value, "/layout"));
    }
    if let Some(value) = obj.get("comparison") {
        config.comparison = Some(b.comparison(value, "/comparison"));
    }

    if b.issues.is_empty() {
        Ok(config)
    } else {
        Err(b.issues)
    }
}

struct SchemaBuilder {
    issues: Vec<ValidationIssue>,
}

impl SchemaBuilder {
    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>, keyword: Keyword) {
        self.issues.push(ValidationIssue::new(path, message, keyword));
    }

    fn object<'a>(&mut self, value: &'a JsonValue, path: &str) -> Option<&'a JsonMap> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.issue(path, "must be a mapping", Keyword::Type);
                None
            }
        }
    }

    fn list<T>(
        &mut self,
        items: &[JsonValue],
        path: &str,
        build: fn(&mut Self, &JsonValue, &str) -> T,
    ) -> Vec<T> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| build(self, item, &format!("{path}/{index}")))
            .collect()
    }

    fn optional_list<T>(
        &mut self,
        obj: &JsonMap,
        path: &str,
        key: &str,
        build: fn(&mut Self, &JsonValue, &str) -> T,
    ) -> Vec<T> {
        match obj.get(key) {
            Some(JsonValue::Array(items)) => self.list(items, path, build),
            Some(_) => {
                self.issue(path, "must be a list", Keyword::Type);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn string_field(&mut self, obj: &JsonMap, path: &str, key: &str) -> Option<String> {
        match obj.get(key) {
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a string", Keyword::Type);
                None
            }
            None => None,
        }
    }

    fn require_string(&mut self, obj: &JsonMap, path: &str, key: &str) -> String {
        match obj.get(key) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            Some(JsonValue::String(_)) => {
                self.issue(format!("{path}/{key}"), "must not be empty", Keyword::Minimum);
                String::new()
            }
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a string", Keyword::Type);
                String::new()
            }
            None => {
                self.issue(
                    format!("{path}/{key}"),
                    "missing required field",
                    Keyword::Required,
                );
                String::new()
            }
        }
    }

    fn number_field(&mut self, obj: &JsonMap, path: &str, key: &str, min: Option<f64>) -> Option<f64> {
        match obj.get(key) {
            Some(JsonValue::Number(n)) => {
                let n = n.as_f64().unwrap_or(0.0);
                if min.is_some_and(|min| n < min) {
                    self.issue(
                        format!("{path}/{key}"),
                        format!("must be at least {}", min.unwrap_or(0.0)),
                        Keyword::Minimum,
                    );
                    return None;
                }
                Some(n)
            }
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a number", Keyword::Type);
                None
            }
            None => None,
        }
    }

    fn require_number(&mut self, obj: &JsonMap, path: &str, key: &str, min: Option<f64>) -> f64 {
        if !obj.contains_key(key) {
            self.issue(
                format!("{path}/{key}"),
                "missing required field",
                Keyword::Required,
            );
            return 0.0;
        }
        self.number_field(obj, path, key, min).unwrap_or(0.0)
    }

    fn bool_field(&mut self, obj: &JsonMap, path: &str, key: &str) -> Option<bool> {
        match obj.get(key) {
            Some(JsonValue::Bool(value)) => Some(*value),
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a boolean", Keyword::Type);
                None
            }
            None => None,
        }
    }

    fn string_list(&mut self, obj: &JsonMap, path: &str, key: &str) -> Vec<String> {
        match obj.get(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    JsonValue::String(s) => Some(s.clone()),
                    _ => {
                        self.issue(
                            format!("{path}/{key}/{index}"),
                            "must be a string",
                            Keyword::Type,
                        );
                        None
                    }
                })
                .collect(),
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a list", Keyword::Type);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn enum_field<T: DeserializeOwned>(
        &mut self,
        obj: &JsonMap,
        path: &str,
        key: &str,
        allowed: &str,
    ) -> Option<T> {
        let value = obj.get(key)?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.issue(
                    format!("{path}/{key}"),
                    format!("must be one of: {allowed}"),
                    Keyword::Enum,
                );
                None
            }
        }
    }

    fn expr_map(&mut self, obj: &JsonMap, path: &str, key: &str) -> IndexMap<String, Expr> {
        match obj.get(key) {
            Some(JsonValue::Object(entries)) => entries
                .iter()
                .map(|(name, expr)| (name.clone(), expr.clone()))
                .collect(),
            Some(_) => {
                self.issue(format!("{path}/{key}"), "must be a mapping", Keyword::Type);
                IndexMap::new()
            }
            None => IndexMap::new(),
        }
    }

    fn metadata(&mut self, value: &JsonValue, path: &str) -> MetadataConfig {
        let mut metadata = MetadataConfig::default();
        let Some(obj) = self.object(value, path) else {
            return metadata;
        };
        metadata.title = self.string_field(obj, path, "title");
        metadata.description = self.string_field(obj, path, "description");
        metadata.author = self.string_field(obj, path, "author");
        metadata.tags = self.string_list(obj, path, "tags");
        metadata
    }

    fn canvas(&mut self, value: &JsonValue, path: &str) -> CanvasConfig {
        let mut canvas = CanvasConfig::default();
        let Some(obj) = self.object(value, path) else {
            return canvas;
        };
        if let Some(width) = self.number_field(obj, path, "width", Some(0.0)) {
            canvas.width = width;
        }
        if let Some(height) = self.number_field(obj, path, "height", Some(0.0)) {
            canvas.height = height;
        }
        if let Some(background) = self.string_field(obj, path, "background") {
            canvas.background = background;
        }
        canvas.sections = self.optional_list(
            obj,
            &format!("{path}/sections"),
            "sections",
            SchemaBuilder::section,
        );
        canvas
    }

    fn section(&mut self, value: &JsonValue, path: &str) -> SectionConfig {
        let mut section = SectionConfig::default();
        let Some(obj) = self.object(value, path) else {
            return section;
        };
        section.id = self.require_string(obj, path, "id");
        section.label = self.string_field(obj, path, "label");
        section.y = self.require_number(obj, path, "y", Some(0.0));
        section.height = self.require_number(obj, path, "height", Some(0.0));
        if let Some(style) = obj.get("style") {
            let style_path = format!("{path}/style");
            if let Some(style_obj) = self.object(style, &style_path) {
                section.style.background = self.string_field(style_obj, &style_path, "background");
                section.style.label_color =
                    self.string_field(style_obj, &style_path, "labelColor");
            }
        }
        section
    }

    fn node(&mut self, value: &JsonValue, path: &str) -> NodeConfig {
        let mut node = NodeConfig::default();
        let Some(obj) = self.object(value, path) else {
            return node;
        };
        node.id = self.require_string(obj, path, "id");
        node.label = self.require_string(obj, path, "label");
        if let Some(node_type) =
            self.enum_field::<NodeType>(obj, path, "type", "box, circle, database, icon, group")
        {
            node.node_type = node_type;
        }
        node.position = self.point(obj, path, "position");
        node.section = self.string_field(obj, path, "section");
        if let Some(style) = obj.get("style") {
            let style_path = format!("{path}/style");
            if let Some(style_obj) = self.object(style, &style_path) {
                node.style.color = self.string_field(style_obj, &style_path, "color");
                node.style.shape = self.enum_field::<NodeShape>(
                    style_obj,
                    &style_path,
                    "shape",
                    "rectangle, rounded-rect, circle, ellipse, cylinder",
                );
                node.style.width = self.number_field(style_obj, &style_path, "width", Some(0.0));
                node.style.height = self.number_field(style_obj, &style_path, "height", Some(0.0));
            }
        }
        node
    }

    fn point(&mut self, obj: &JsonMap, path: &str, key: &str) -> Point {
        let field_path = format!("{path}/{key}");
        match obj.get(key) {
            Some(value) => match self.object(value, &field_path) {
                Some(point_obj) => Point::new(
                    self.require_number(point_obj, &field_path, "x", Some(0.0)),
                    self.require_number(point_obj, &field_path, "y", Some(0.0)),
                ),
                None => Point::default(),
            },
            None => {
                self.issue(field_path, "missing required field", Keyword::Required);
                Point::default()
            }
        }
    }

    fn edge(&mut self, value: &JsonValue, path: &str) -> EdgeConfig {
        let mut edge = EdgeConfig::default();
        let Some(obj) = self.object(value, path) else {
            return edge;
        };
        edge.id = self.require_string(obj, path, "id");
        edge.from = self.require_string(obj, path, "from");
        edge.to = self.require_string(obj, path, "to");
        edge.label = self.string_field(obj, path, "label");
        if let Some(style) = obj.get("style") {
            let style_path = format!("{path}/style");
            if let Some(style_obj) = self.object(style, &style_path) {
                edge.style.color = self.string_field(style_obj, &style_path, "color");
                if let Some(line_type) = self.enum_field::<LineType>(
                    style_obj,
                    &style_path,
                    "lineType",
                    "solid, dashed, dotted",
                ) {
                    edge.style.line_type = line_type;
                }
                edge.style.width = self.number_field(style_obj, &style_path, "width", Some(0.0));
            }
        }
        edge
    }

    fn scenario(&mut self, value: &JsonValue, path: &str) -> ScenarioConfig {
        let mut scenario = ScenarioConfig::default();
        let Some(obj) = self.object(value, path) else {
            return scenario;
        };
        scenario.id = self.require_string(obj, path, "id");
        scenario.name = self.string_field(obj, path, "name");
        scenario.description = self.string_field(obj, path, "description");
        scenario.init = self.expr_map(obj, path, "init");
        scenario.steps =
            self.optional_list(obj, &format!("{path}/steps"), "steps", SchemaBuilder::step);
        scenario
    }

    fn step(&mut self, value: &JsonValue, path: &str) -> StepConfig {
        let mut step = StepConfig::default();
        let Some(obj) = self.object(value, path) else {
            return step;
        };
        match obj.get("action") {
            Some(action) => match serde_json::from_value::<ActionKind>(action.clone()) {
                Ok(kind) => step.action = kind,
                Err(_) => self.issue(
                    format!("{path}/action"),
                    "must be one of: highlight, animate-edge, delay, reset, log, update-stat, \
                     conditional, goto, parallel",
                    Keyword::Enum,
                ),
            },
            None => self.issue(
                format!("{path}/action"),
                "missing required field",
                Keyword::Required,
            ),
        }
        step.label = self.string_field(obj, path, "label");
        step.nodes = self.string_list(obj, path, "nodes");
        step.edges = self.string_list(obj, path, "edges");
        step.edge = self.string_field(obj, path, "edge");
        step.animation_label = self.string_field(obj, path, "animationLabel");
        if let Some(style) = obj.get("style") {
            let style_path = format!("{path}/style");
            if let Some(style_obj) = self.object(style, &style_path) {
                step.style = Some(HighlightStyle {
                    color: self.string_field(style_obj, &style_path, "color"),
                    glow: self.bool_field(style_obj, &style_path, "glow").unwrap_or(false),
                });
            }
        }
        step.duration = self.duration(obj, path);
        step.log = self.log_spec(obj, path);
        step.stats = self.expr_map(obj, path, "stats");
        step.condition = obj.get("condition").cloned();
        step.then_steps =
            self.optional_list(obj, &format!("{path}/then"), "then", SchemaBuilder::step);
        if let Some(JsonValue::Array(_)) = obj.get("else") {
            step.else_steps = Some(self.optional_list(
                obj,
                &format!("{path}/else"),
                "else",
                SchemaBuilder::step,
            ));
        } else if obj.contains_key("else") {
            self.issue(format!("{path}/else"), "must be a list", Keyword::Type);
        }
        step.scenario = self.string_field(obj, path, "scenario");
        step.steps =
            self.optional_list(obj, &format!("{path}/steps"), "steps", SchemaBuilder::step);

        // Fields without which the action cannot execute are caught here
        // rather than at run time.
        match step.action {
            ActionKind::AnimateEdge if step.edge.is_none() => self.issue(
                format!("{path}/edge"),
                "animate-edge step requires an edge",
                Keyword::Required,
            ),
            ActionKind::Goto if step.scenario.is_none() => self.issue(
                format!("{path}/scenario"),
                "goto step requires a target scenario",
                Keyword::Required,
            ),
            ActionKind::Log if step.log.is_none() => self.issue(
                format!("{path}/log"),
                "log step requires a message",
                Keyword::Required,
            ),
            ActionKind::UpdateStat if step.stats.is_empty() => self.issue(
                format!("{path}/stats"),
                "update-stat step requires stat deltas",
                Keyword::Required,
            ),
            _ => {}
        }
        step
    }

    fn duration(&mut self, obj: &JsonMap, path: &str) -> Option<Expr> {
        match obj.get("duration") {
            Some(JsonValue::Number(n)) => {
                if n.as_f64().unwrap_or(0.0) < 0.0 {
                    self.issue(
                        format!("{path}/duration"),
                        "must be at least 0",
                        Keyword::Minimum,
                    );
                    return None;
                }
                Some(JsonValue::Number(n.clone()))
            }
            Some(expr @ JsonValue::Object(_)) => Some(expr.clone()),
            Some(_) => {
                self.issue(
                    format!("{path}/duration"),
                    "must be a non-negative number or an expression",
                    Keyword::Type,
                );
                None
            }
            None => None,
        }
    }

    fn log_spec(&mut self, obj: &JsonMap, path: &str) -> Option<LogSpec> {
        let value = obj.get("log")?;
        let log_path = format!("{path}/log");
        match value {
            // `log: "message"` shorthand.
            JsonValue::String(message) => Some(LogSpec {
                message: message.clone(),
                level: LogLevel::default(),
            }),
            JsonValue::Object(log_obj) => {
                let message = self.require_string(log_obj, &log_path, "message");
                let level = self
                    .enum_field::<LogLevel>(
                        log_obj,
                        &log_path,
                        "level",
                        "info, success, warning, error",
                    )
                    .unwrap_or_default();
                Some(LogSpec { message, level })
            }
            _ => {
                self.issue(log_path, "must be a string or a mapping", Keyword::Type);
                None
            }
        }
    }

    fn preset(&mut self, value: &JsonValue, path: &str) -> PresetConfig {
        let mut preset = PresetConfig::default();
        let Some(obj) = self.object(value, path) else {
            return preset;
        };
        preset.id = self.require_string(obj, path, "id");
        preset.name = self.require_string(obj, path, "name");
        preset.description = self.string_field(obj, path, "description");
        preset.is_default = self.bool_field(obj, path, "default").unwrap_or(false);
        preset.extends = self.string_field(obj, path, "extends");
        preset.variables = self.expr_map(obj, path, "variables");
        preset
    }

    fn stat(&mut self, value: &JsonValue, path: &str) -> StatConfig {
        let mut stat = StatConfig::default();
        let Some(obj) = self.object(value, path) else {
            return stat;
        };
        stat.id = self.require_string(obj, path, "id");
        stat.label = self.require_string(obj, path, "label");
        stat.initial_value = self
            .number_field(obj, path, "initialValue", None)
            .unwrap_or(0.0);
        if let Some(format) = self.enum_field::<StatFormat>(
            obj,
            path,
            "format",
            "number, percentage, duration, bytes",
        ) {
            stat.format = format;
        }
        stat.unit = self.string_field(obj, path, "unit");
        stat
    }

    fn logging(&mut self, value: &JsonValue, path: &str) -> LoggingConfig {
        let mut logging = LoggingConfig::default();
        let Some(obj) = self.object(value, path) else {
            return logging;
        };
        if let Some(enabled) = self.bool_field(obj, path, "enabled") {
            logging.enabled = enabled;
        }
        if let Some(max_entries) = self.number_field(obj, path, "maxEntries", Some(0.0)) {
            logging.max_entries = max_entries as usize;
        }
        logging.timestamp_format = self.string_field(obj, path, "timestampFormat");
        logging
    }

    fn layout(&mut self, value: &JsonValue, path: &str) -> LayoutConfig {
        let mut layout = LayoutConfig::default();
        let Some(obj) = self.object(value, path) else {
            return layout;
        };
        if let Some(header) = obj.get("header") {
            let header_path = format!("{path}/header");
            if let Some(header_obj) = self.object(header, &header_path) {
                layout.header = Some(HeaderConfig {
                    title: self.string_field(header_obj, &header_path, "title"),
                    subtitle: self.string_field(header_obj, &header_path, "subtitle"),
                });
            }
        }
        if let Some(legend) = obj.get("legend") {
            let legend_path = format!("{path}/legend");
            if let Some(legend_obj) = self.object(legend, &legend_path) {
                layout.legend = Some(LegendConfig {
                    enabled: self
                        .bool_field(legend_obj, &legend_path, "enabled")
                        .unwrap_or(true),
                    items: self.optional_list(
                        legend_obj,
                        &format!("{legend_path}/items"),
                        "items",
                        SchemaBuilder::legend_item,
                    ),
                });
            }
        }
        if let Some(footer) = obj.get("footer") {
            let footer_path = format!("{path}/footer");
            if let Some(footer_obj) = self.object(footer, &footer_path) {
                layout.footer = Some(FooterConfig {
                    text: self.string_field(footer_obj, &footer_path, "text"),
                });
            }
        }
        layout
    }

    fn legend_item(&mut self, value: &JsonValue, path: &str) -> LegendItem {
        let mut item = LegendItem::default();
        let Some(obj) = self.object(value, path) else {
            return item;
        };
        item.label = self.require_string(obj, path, "label");
        item.color = self.require_string(obj, path, "color");
        item
    }

    fn comparison(&mut self, value: &JsonValue, path: &str) -> ComparisonConfig {
        let mut comparison = ComparisonConfig::default();
        let Some(obj) = self.object(value, path) else {
            return comparison;
        };
        comparison.enabled = self.bool_field(obj, path, "enabled").unwrap_or(false);
        comparison.title = self.string_field(obj, path, "title");
        comparison.items = self.optional_list(
            obj,
            &format!("{path}/items"),
            "items",
            SchemaBuilder::comparison_item,
        );
        comparison
    }

    fn comparison_item(&mut self, value: &JsonValue, path: &str) -> ComparisonItem {
        let mut item = ComparisonItem::default();
        let Some(obj) = self.object(value, path) else {
            return item;
        };
        item.preset = self.require_string(obj, path, "preset");
        item.label = self.string_field(obj, path, "label");
        item.description = self.string_field(obj, path, "description");
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> JsonValue {
        json!({
            "version": "1.0",
            "nodes": [
                {"id": "a", "label": "A", "position": {"x": 0, "y": 0}}
            ]
        })
    }

    #[test]
    fn minimal_config_builds() {
        let config = build_config(&minimal(), false).expect("should validate");
        assert_eq!(config.version, "1.0");
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.nodes[0].id, "a");
    }

    #[test]
    fn accumulates_all_issues_in_one_pass() {
        let doc = json!({
            "nodes": [
                {"label": 7, "position": {"x": -1, "y": 0}},
            ],
            "edges": [{"id": "e"}],
            "bogus": true
        });
        let issues = build_config(&doc, false).unwrap_err();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"/version"));
        assert!(paths.contains(&"/nodes/0/id"));
        assert!(paths.contains(&"/nodes/0/label"));
        assert!(paths.contains(&"/nodes/0/position/x"));
        assert!(paths.contains(&"/edges/0/from"));
        assert!(paths.contains(&"/edges/0/to"));
        assert!(paths.contains(&"/bogus"));
        assert!(issues.iter().any(|i| i.keyword == Keyword::AdditionalProperties));
    }

    #[test]
    fn unknown_root_fields_can_be_permitted() {
        let mut doc = minimal();
        doc["custom"] = json!(1);
        assert!(build_config(&doc, false).is_err());
        assert!(build_config(&doc, true).is_ok());
    }

    #[test]
    fn empty_node_list_is_rejected() {
        let doc = json!({"version": "1", "nodes": []});
        let issues = build_config(&doc, false).unwrap_err();
        assert!(issues.iter().any(|i| i.path == "/nodes" && i.keyword == Keyword::Minimum));
    }

    #[test]
    fn action_specific_required_fields() {
        let mut doc = minimal();
        doc["scenarios"] = json!([{
            "id": "s",
            "steps": [
                {"action": "animate-edge"},
                {"action": "goto"},
                {"action": "log"},
                {"action": "update-stat"},
                {"action": "frobnicate"}
            ]
        }]);
        let issues = build_config(&doc, false).unwrap_err();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"/scenarios/0/steps/0/edge"));
        assert!(paths.contains(&"/scenarios/0/steps/1/scenario"));
        assert!(paths.contains(&"/scenarios/0/steps/2/log"));
        assert!(paths.contains(&"/scenarios/0/steps/3/stats"));
        assert!(issues.iter().any(|i| {
            i.path == "/scenarios/0/steps/4/action" && i.keyword == Keyword::Enum
        }));
    }

    #[test]
    fn nested_conditional_steps_are_walked() {
        let mut doc = minimal();
        doc["scenarios"] = json!([{
            "id": "s",
            "steps": [{
                "action": "conditional",
                "condition": true,
                "then": [{"action": "goto"}],
                "else": [{"action": "delay", "duration": -5}]
            }]
        }]);
        let issues = build_config(&doc, false).unwrap_err();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"/scenarios/0/steps/0/then/0/scenario"));
        assert!(paths.contains(&"/scenarios/0/steps/0/else/0/duration"));
    }

    #[test]
    fn log_shorthand_and_levels() {
        let mut doc = minimal();
        doc["scenarios"] = json!([{
            "id": "s",
            "steps": [
                {"action": "log", "log": "plain message"},
                {"action": "log", "log": {"message": "m", "level": "warning"}}
            ]
        }]);
        let config = build_config(&doc, false).expect("should validate");
        let steps = &config.scenarios[0].steps;
        assert_eq!(steps[0].log.as_ref().map(|l| l.level), Some(LogLevel::Info));
        assert_eq!(
            steps[1].log.as_ref().map(|l| l.level),
            Some(LogLevel::Warning)
        );
    }

    #[test]
    fn version_number_is_coerced_to_string() {
        let mut doc = minimal();
        doc["version"] = json!(2);
        let config = build_config(&doc, false).expect("should validate");
        assert_eq!(config.version, "2");
    }
}
