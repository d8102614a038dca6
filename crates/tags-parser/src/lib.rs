//! Markup parser for Tags templates.
//!
//! This crate turns markup text into the minimal node shape the normalizer
//! walks: elements with ordered attributes and children, text, CDATA,
//! comments and processing instructions.
//! Built on `nom` for the lexical pieces.

mod grammar;
mod lexer;

pub use grammar::parse;
pub use lexer::decode_entities;

use tags_core::{MarkupElement, ParseError};

/// Parse markup text and return its document element.
///
/// # Example
///
/// ```
/// use tags_parser::parse_markup;
///
/// let root = parse_markup("<div class='a'>Hello <span>World</span></div>").unwrap();
/// assert_eq!(root.name, "div");
/// assert_eq!(root.attribute("class"), Some("a"));
/// assert_eq!(root.children.len(), 2);
/// ```
pub fn parse_markup(source: &str) -> Result<MarkupElement, ParseError> {
    parse(source)
}
