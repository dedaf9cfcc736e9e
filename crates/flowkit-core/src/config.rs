//! The validated diagram definition tree.
//!
//! A [`DiagramConfig`] is the output of `flowkit-parser` and the input to
//! model construction in `flowkit`. All types here are plain data with
//! [`serde`] derives; field names follow the document's camelCase keys.
//!
//! Styling fields are optional in the document and resolved against the
//! defaults below through the accessor methods (e.g.
//! [`NodeStyle::color`]), so consumers never see a half-styled entity.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// An unevaluated expression, kept as the raw parse tree.
///
/// Expressions are interpreted at run time by the expression evaluator:
/// a scalar is a literal, an object with a single `$`-prefixed key is an
/// operator application.
pub type Expr = serde_json::Value;

/// Default step duration in milliseconds when a step omits `duration`.
pub const DEFAULT_STEP_DURATION_MS: f64 = 1000.0;

pub const DEFAULT_CANVAS_WIDTH: f64 = 1200.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;
pub const DEFAULT_CANVAS_BACKGROUND: &str = "#ffffff";

pub const DEFAULT_NODE_COLOR: &str = "#3b82f6";
pub const DEFAULT_NODE_WIDTH: f64 = 120.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 60.0;

pub const DEFAULT_EDGE_COLOR: &str = "#adb5bd";
pub const DEFAULT_EDGE_WIDTH: f64 = 3.0;

/// Root of a validated diagram definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramConfig {
    pub version: String,
    pub metadata: Option<MetadataConfig>,
    pub canvas: CanvasConfig,
    pub nodes: Vec<NodeConfig>,
    pub edges: Vec<EdgeConfig>,
    pub scenarios: Vec<ScenarioConfig>,
    pub presets: Vec<PresetConfig>,
    pub stats: Vec<StatConfig>,
    pub logging: Option<LoggingConfig>,
    pub layout: Option<LayoutConfig>,
    pub comparison: Option<ComparisonConfig>,
}

/// Free-form document metadata; not interpreted by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

/// Canvas dimensions, background, and horizontal section bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Background color as a CSS color string.
    pub background: String,
    pub sections: Vec<SectionConfig>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: DEFAULT_CANVAS_BACKGROUND.to_owned(),
            sections: Vec::new(),
        }
    }
}

/// A full-width horizontal band used to group nodes visually.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    pub id: String,
    pub label: Option<String>,
    /// Top edge of the band in canvas coordinates.
    pub y: f64,
    pub height: f64,
    pub style: SectionStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionStyle {
    pub background: Option<String>,
    pub label_color: Option<String>,
}

/// Semantic node category; affects the default shape only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Box,
    Circle,
    Database,
    Icon,
    Group,
}

impl NodeType {
    /// The shape drawn when the node's style does not pick one explicitly.
    pub fn default_shape(self) -> NodeShape {
        match self {
            NodeType::Circle => NodeShape::Circle,
            NodeType::Database => NodeShape::Cylinder,
            NodeType::Box | NodeType::Icon | NodeType::Group => NodeShape::RoundedRect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    Rectangle,
    #[default]
    RoundedRect,
    Circle,
    Ellipse,
    Cylinder,
}

/// A diagram node as authored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Center position in canvas coordinates.
    pub position: Point,
    /// Id of the section band this node belongs to, if any.
    pub section: Option<String>,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    pub color: Option<String>,
    pub shape: Option<NodeShape>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl NodeStyle {
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_NODE_COLOR)
    }

    /// Resolved shape, falling back to the node type's default.
    pub fn shape(&self, node_type: NodeType) -> NodeShape {
        self.shape.unwrap_or_else(|| node_type.default_shape())
    }

    pub fn width(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_NODE_WIDTH)
    }

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_NODE_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineType {
    /// Returns the SVG `stroke-dasharray` value, or `None` for solid lines.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            LineType::Solid => None,
            LineType::Dashed => Some("8 4"),
            LineType::Dotted => Some("2 4"),
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeConfig {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeStyle {
    pub color: Option<String>,
    pub line_type: LineType,
    pub width: Option<f64>,
}

impl EdgeStyle {
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_EDGE_COLOR)
    }

    pub fn width(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_EDGE_WIDTH)
    }
}

/// A named, ordered sequence of steps over the diagram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioConfig {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Variables assigned into the variable store when the run starts.
    pub init: IndexMap<String, Expr>,
    pub steps: Vec<StepConfig>,
}

impl ScenarioConfig {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// The step's action kind; selects which other fields are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Highlight,
    AnimateEdge,
    #[default]
    Delay,
    Reset,
    Log,
    UpdateStat,
    Conditional,
    Goto,
    Parallel,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Highlight => "highlight",
            ActionKind::AnimateEdge => "animate-edge",
            ActionKind::Delay => "delay",
            ActionKind::Reset => "reset",
            ActionKind::Log => "log",
            ActionKind::UpdateStat => "update-stat",
            ActionKind::Conditional => "conditional",
            ActionKind::Goto => "goto",
            ActionKind::Parallel => "parallel",
        }
    }
}

/// One unit of scenario execution.
///
/// Only the fields relevant to [`StepConfig::action`] are populated;
/// schema validation enforces the per-action required ones (an
/// `animate-edge` without `edge` never reaches execution).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepConfig {
    pub action: ActionKind,
    /// Explicit progress label; synthesized from action + target if absent.
    pub label: Option<String>,
    /// Node ids to highlight.
    pub nodes: Vec<String>,
    /// Edge ids to highlight.
    pub edges: Vec<String>,
    /// The edge to animate (`animate-edge`).
    pub edge: Option<String>,
    pub style: Option<HighlightStyle>,
    /// Label carried by the in-flight animation dot (`animate-edge`).
    pub animation_label: Option<String>,
    /// Wait duration in milliseconds; literal or expression.
    pub duration: Option<Expr>,
    pub log: Option<LogSpec>,
    /// Stat deltas applied via increment, keyed by stat id.
    pub stats: IndexMap<String, Expr>,
    /// Branch condition (`conditional`); absent means always true.
    pub condition: Option<Expr>,
    #[serde(rename = "then")]
    pub then_steps: Vec<StepConfig>,
    #[serde(rename = "else")]
    pub else_steps: Option<Vec<StepConfig>>,
    /// Target scenario id (`goto`).
    pub scenario: Option<String>,
    /// Concurrent children (`parallel`).
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightStyle {
    pub color: Option<String>,
    pub glow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A log line emitted by a `log` step or a step's `log` side effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSpec {
    pub message: String,
    pub level: LogLevel,
}

/// A named, inheritable bundle of variable overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresetConfig {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Marks the preset applied when no explicit choice is made.
    #[serde(rename = "default")]
    pub is_default: bool,
    /// Parent preset id; the chain must be acyclic.
    pub extends: Option<String>,
    /// Variable-name to expression map; own entries win over inherited.
    pub variables: IndexMap<String, Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFormat {
    #[default]
    Number,
    Percentage,
    Duration,
    Bytes,
}

/// An independently tracked numeric display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatConfig {
    pub id: String,
    pub label: String,
    pub initial_value: f64,
    pub format: StatFormat,
    pub unit: Option<String>,
}

/// On-screen log panel configuration, carried for embedding UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub timestamp_format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 100,
            timestamp_format: None,
        }
    }
}

/// Decorative page furniture around the canvas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub header: Option<HeaderConfig>,
    pub legend: Option<LegendConfig>,
    pub footer: Option<FooterConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderConfig {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendConfig {
    pub enabled: bool,
    pub items: Vec<LegendItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendItem {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterConfig {
    pub text: Option<String>,
}

/// Side-by-side preset comparison configuration, carried for embedding UIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonConfig {
    pub enabled: bool,
    pub title: Option<String>,
    pub items: Vec<ComparisonItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonItem {
    /// Preset applied for this comparison column.
    pub preset: String,
    pub label: Option<String>,
    pub description: Option<String>,
}
