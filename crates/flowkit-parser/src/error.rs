//! Error types for the parsing and validation pipeline.
//!
//! Parsing produces a [`ParseError`] carrying position information;
//! validation produces a [`ValidationError`] carrying every problem found
//! in one pass, so authors can fix a definition without replaying the
//! parse once per mistake.

use std::fmt;

use thiserror::Error;

/// Classifies what a validation issue violated, in the style of JSON
/// Schema keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// A required field is missing.
    Required,
    /// A field has the wrong type.
    Type,
    /// A field's value is outside its enumerated set.
    Enum,
    /// A numeric field is below its minimum.
    Minimum,
    /// An unknown field was present where none are allowed.
    AdditionalProperties,
    /// An id collides with an earlier one in the same collection.
    UniqueId,
    /// An id references an entity that does not exist.
    Reference,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Required => "required",
            Keyword::Type => "type",
            Keyword::Enum => "enum",
            Keyword::Minimum => "minimum",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::UniqueId => "uniqueId",
            Keyword::Reference => "reference",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation problem at a JSON-pointer-style path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path into the document, e.g. `/nodes/2/id`.
    pub path: String,
    pub message: String,
    pub keyword: Keyword,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>, keyword: Keyword) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            keyword,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Malformed input text.
#[derive(Debug, Clone, Error)]
pub struct ParseError {
    line: usize,
    column: usize,
    message: String,
    snippet: Option<String>,
}

impl ParseError {
    /// Creates a parse error at a 1-based line and column.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            snippet: None,
        }
    }

    /// Attaches the offending source line.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn snippet(&self) -> Option<&str> {
        self.snippet.as_deref()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )?;
        if let Some(snippet) = &self.snippet {
            write!(f, "\n  | {snippet}")?;
        }
        Ok(())
    }
}

/// Schema or reference violations, accumulated over the whole document.
#[derive(Debug, Clone, Error)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} validation error{} found:",
            self.issues.len(),
            if self.issues.len() == 1 { "" } else { "s" }
        )?;
        for (index, issue) in self.issues.iter().enumerate() {
            writeln!(f, "  {}. {issue}", index + 1)?;
        }
        Ok(())
    }
}

/// Error type for the parse pipeline.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
