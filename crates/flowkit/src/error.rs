//! Error types for engine operations.
//!
//! [`Error`] is the single error type surfaced by the public API. Parse
//! and validation failures are passed through from `flowkit-parser`;
//! execution failures and limit trips originate here.

use std::{fmt, io};

use thiserror::Error;

use flowkit_parser::{ParseError, ParserError, ValidationError};

/// Which safety fuse a run tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Total step executions within one run.
    StepExecutions,
    /// Nested `goto` depth.
    GotoDepth,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::StepExecutions => f.write_str("step execution"),
            LimitKind::GotoDepth => f.write_str("goto depth"),
        }
    }
}

/// The main error type for engine operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Runtime lookup or evaluation failure: unknown scenario, preset,
    /// variable, or a malformed expression shape.
    #[error("execution error: {0}")]
    Execution(String),

    /// A safety fuse tripped; always fatal to the run.
    #[error("{kind} limit exceeded ({actual} > {limit})")]
    LimitExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

impl Error {
    pub(crate) fn execution(message: impl Into<String>) -> Self {
        Error::Execution(message.into())
    }
}

impl From<ParserError> for Error {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::Parse(err) => Error::Parse(err),
            ParserError::Validation(err) => Error::Validation(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_display_names_the_fuse() {
        let err = Error::LimitExceeded {
            kind: LimitKind::GotoDepth,
            limit: 10,
            actual: 11,
        };
        assert_eq!(err.to_string(), "goto depth limit exceeded (11 > 10)");
    }
}
