//! Parser for flowkit diagram definitions.
//!
//! Turns a textual definition — JSON or the indentation-based structured
//! format — into a validated [`DiagramConfig`]. The pipeline runs in
//! stages, each able to fail independently:
//!
//! 1. Format detection and structural parse to a generic tree (with
//!    best-effort indentation repair for structured text whose leading
//!    whitespace was stripped by an embedding context)
//! 2. Schema validation, accumulating every issue
//! 3. Duplicate-id validation
//! 4. Cross-reference validation
//!
//! Stages 3 and 4 can be switched off via [`ParseOptions`] for partial
//! validation workflows.
//!
//! # Example
//!
//! ```
//! let source = r#"
//! version: "1.0"
//! nodes:
//!   - id: app
//!     label: App
//!     position: {x: 100, y: 100}
//! "#;
//!
//! let config = flowkit_parser::parse(source).expect("valid definition");
//! assert_eq!(config.nodes[0].id, "app");
//! ```

pub mod error;

mod document;
mod indent;
mod scalar;
mod schema;
mod validate;

pub use error::{Keyword, ParseError, ParserError, ValidationError, ValidationIssue};

use log::{debug, info};

use flowkit_core::config::DiagramConfig;

/// Input format of a diagram definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// The indentation-based YAML-like format.
    Structured,
    Json,
}

/// Options controlling the parse pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Explicit format; auto-detected when `None`.
    pub format: Option<DocumentFormat>,
    /// Skip duplicate-id validation.
    pub skip_unique_id_validation: bool,
    /// Skip cross-reference validation.
    pub skip_reference_validation: bool,
    /// Accept unknown top-level fields instead of rejecting them.
    pub allow_unknown_fields: bool,
}

/// A reusable parser configured with [`ParseOptions`].
#[derive(Debug, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parses and validates a diagram definition.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Parse`] for malformed text and
    /// [`ParserError::Validation`] with the full issue list for schema,
    /// duplicate-id, or reference violations.
    pub fn parse(&self, source: &str) -> Result<DiagramConfig, ParserError> {
        let doc_format = document::detect_format(source, self.options.format);
        debug!(doc_format:?; "Parsing diagram definition");

        // Fully flat structured text has had its nesting stripped by an
        // embedding context; a flat parse would "succeed" with a mangled
        // tree, so repair is attempted up front. If the repaired text
        // fails to parse, the original text's own error is surfaced.
        let repaired = match doc_format {
            DocumentFormat::Structured => indent::repair_indentation(source),
            DocumentFormat::Json => None,
        };
        let tree = match repaired {
            Some(repaired) => match document::parse_document(&repaired, doc_format) {
                Ok(tree) => {
                    info!("Recovered definition through indentation repair");
                    tree
                }
                Err(_) => document::parse_document(source, doc_format)?,
            },
            None => document::parse_document(source, doc_format)?,
        };

        let config = schema::build_config(&tree, self.options.allow_unknown_fields)
            .map_err(ValidationError::new)?;

        let mut issues = Vec::new();
        if !self.options.skip_unique_id_validation {
            issues.extend(validate::validate_unique_ids(&config));
        }
        if !self.options.skip_reference_validation {
            issues.extend(validate::validate_references(&config));
        }
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }

        debug!(
            nodes = config.nodes.len(),
            edges = config.edges.len(),
            scenarios = config.scenarios.len();
            "Diagram definition validated"
        );
        Ok(config)
    }
}

/// Parses a diagram definition with default options.
pub fn parse(source: &str) -> Result<DiagramConfig, ParserError> {
    Parser::default().parse(source)
}
