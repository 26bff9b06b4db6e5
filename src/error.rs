//! Error types for the content pipeline
//!
//! Listing assembly swallows these (logging and omitting the document), while
//! the single-document path hands them to the caller as a typed outcome.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure to read a document from the content store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document exists for the identifier
    #[error("no content document for '{0}'")]
    NotFound(String),

    /// The document exists but could not be read
    #[error("failed to read '{identifier}': {source}")]
    Io {
        identifier: String,
        #[source]
        source: std::io::Error,
    },
}

/// Why a front-matter field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureReason {
    Missing,
    Empty,
    WrongType(&'static str),
    BadDate(String),
    Malformed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Missing => write!(f, "is missing"),
            FailureReason::Empty => write!(f, "is empty"),
            FailureReason::WrongType(expected) => write!(f, "must be {}", expected),
            FailureReason::BadDate(raw) => write!(f, "'{}' is not a calendar date", raw),
            FailureReason::Malformed(msg) => write!(f, "could not be decoded: {}", msg),
        }
    }
}

/// Front-matter did not satisfy the publishable invariant
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("front-matter field '{field}' {reason}")]
pub struct ValidationFailure {
    pub field: String,
    pub reason: FailureReason,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Body markup could not be compiled
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message} at line {line}, column {column}")]
pub struct CompileError {
    /// 1-based line in the body text
    pub line: usize,
    /// 1-based column in the body text
    pub column: usize,
    pub message: String,
}

impl CompileError {
    /// Build an error positioned at a byte offset of `source`
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Why a single post could not be produced
#[derive(Error, Debug)]
pub enum PostError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    #[error("failed to compile body: {0}")]
    Compile(#[from] CompileError),
}

impl PostError {
    /// Whether the identifier simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::Store(StoreError::NotFound(_)))
    }
}
