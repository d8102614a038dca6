//! Error types for the Tags engine.

use crate::types::TagId;
use thiserror::Error;

/// Top-level error type for the Tags engine.
#[derive(Debug, Error)]
pub enum TagsError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Activate(#[from] ActivateError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors while parsing markup text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected token at line {line}, column {column}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        found: String,
        expected: String,
        line: u32,
        column: u32,
    },

    #[error("Mismatched closing tag at line {line}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("Unknown entity &{name}; at line {line}")]
    UnknownEntity { name: String, line: u32 },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Content after the root element at line {line}")]
    TrailingContent { line: u32 },

    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Errors while normalizing input into a Tag tree.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("No class registered for tag '{name}' and no default class configured")]
    UnresolvedClass { name: String },

    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Maximum nesting depth ({depth}) exceeded")]
    MaxDepthExceeded { depth: u32 },

    #[error("Unknown tag instance {id}")]
    UnknownTag { id: TagId },
}

/// Errors while binding a Tag to the live document.
#[derive(Debug, Error)]
pub enum ActivateError {
    #[error("No live element matches '{selector}'")]
    MissingLiveElement { selector: String },

    #[error("Tag {id} has neither an element selector nor an id to locate its element")]
    Unlocatable { id: TagId },
}

/// Errors raised by a live document implementation.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("Unknown element handle {handle}")]
    UnknownElement { handle: u64 },

    #[error("Element {handle} is not attached to a parent")]
    Detached { handle: u64 },

    #[error("Markup rejected by the document: {reason}")]
    Markup { reason: String },

    #[error("Document operation failed: {reason}")]
    Host { reason: String },
}

impl From<ParseError> for DocumentError {
    fn from(err: ParseError) -> Self {
        DocumentError::Markup {
            reason: err.to_string(),
        }
    }
}
