//! Grammar rules for markup documents.
//!
//! A small XML subset: one root element, attributes in single or double
//! quotes, self-closing tags, text, CDATA sections, comments, processing
//! instructions and a skipped DOCTYPE.

use nom::bytes::complete::take_until;

use tags_core::{Attribute, MarkupElement, MarkupNode, ParseError, Span};

use crate::lexer::*;

/// Parse a complete markup document and return its root element.
pub fn parse(input: &str) -> Result<MarkupElement, ParseError> {
    let mut parser = Parser::new(input);
    let root = parser.parse_document()?;
    tracing::trace!(root = %root.name, bytes = input.len(), "parsed markup");
    Ok(root)
}

/// Stateful parser that tracks the unconsumed remainder of the source.
struct Parser<'a> {
    source: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source,
        }
    }

    fn offset(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    fn line(&self) -> u32 {
        line_col(self.source, self.offset()).0
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        if self.rest.is_empty() {
            return ParseError::UnexpectedEof;
        }
        let (line, column) = line_col(self.source, self.offset());
        ParseError::UnexpectedToken {
            found: self.rest.chars().take(12).collect(),
            expected: expected.to_string(),
            line,
            column,
        }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, literal: &str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, literal: &str) -> Result<(), ParseError> {
        if self.eat(literal) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", literal)))
        }
    }

    /// Consume everything up to and including `terminator`.
    fn take_through(&mut self, terminator: &str) -> Result<&'a str, ParseError> {
        let result: nom::IResult<&'a str, &'a str> = take_until(terminator)(self.rest);
        match result {
            Ok((rest, body)) => {
                self.rest = &rest[terminator.len()..];
                Ok(body)
            }
            Err(_) => Err(ParseError::UnexpectedEof),
        }
    }

    /// Parse prolog, root element and trailing misc.
    fn parse_document(&mut self) -> Result<MarkupElement, ParseError> {
        self.skip_misc()?;
        if self.rest.is_empty() {
            return Err(ParseError::NoRootElement);
        }
        let root = self.parse_element()?;
        self.skip_misc()?;
        if !self.rest.is_empty() {
            return Err(ParseError::TrailingContent { line: self.line() });
        }
        Ok(root)
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE outside the root.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            if self.eat("<!--") {
                self.take_through("-->")?;
            } else if self.eat("<?") {
                self.take_through("?>")?;
            } else if self.eat("<!DOCTYPE") || self.eat("<!doctype") {
                self.take_through(">")?;
            } else {
                return Ok(());
            }
        }
    }

    /// Parse an element starting at `<name`.
    fn parse_element(&mut self) -> Result<MarkupElement, ParseError> {
        let start = self.offset();
        let (line, column) = line_col(self.source, start);
        self.expect("<")?;

        let (rest, tag_name) = name(self.rest).map_err(|_| self.unexpected("element name"))?;
        self.rest = rest;

        let mut element = MarkupElement::new(tag_name);

        // Attributes, then either `/>` or `>`.
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                element.span = Span {
                    start,
                    end: self.offset(),
                    line,
                    column,
                };
                return Ok(element);
            }
            if self.eat(">") {
                break;
            }
            let (rest, (attr_name, raw_value)) =
                attribute(self.rest).map_err(|_| self.unexpected("attribute or '>'"))?;
            if element.attribute(attr_name).is_some() {
                return Err(self.unexpected("unique attribute name"));
            }
            let value = self.decode(raw_value)?;
            element.attributes.push(Attribute::new(attr_name, value));
            self.rest = rest;
        }

        element.children = self.parse_children(tag_name)?;
        element.span = Span {
            start,
            end: self.offset(),
            line,
            column,
        };
        Ok(element)
    }

    /// Parse child nodes until the matching close tag.
    fn parse_children(&mut self, open_name: &str) -> Result<Vec<MarkupNode>, ParseError> {
        let mut children = Vec::new();
        loop {
            if self.rest.is_empty() {
                return Err(ParseError::UnexpectedEof);
            }
            if self.eat("</") {
                let close_line = self.line();
                let (rest, close_name) =
                    name(self.rest).map_err(|_| self.unexpected("closing tag name"))?;
                if close_name != open_name {
                    return Err(ParseError::MismatchedClose {
                        expected: open_name.to_string(),
                        found: close_name.to_string(),
                        line: close_line,
                    });
                }
                self.rest = rest;
                self.skip_whitespace();
                self.expect(">")?;
                return Ok(children);
            }
            if self.eat("<!--") {
                let body = self.take_through("-->")?;
                children.push(MarkupNode::Comment(body.to_string()));
            } else if self.eat("<![CDATA[") {
                let body = self.take_through("]]>")?;
                children.push(MarkupNode::CData(body.to_string()));
            } else if self.eat("<?") {
                let body = self.take_through("?>")?;
                let (target, data) = match body.split_once(char::is_whitespace) {
                    Some((target, data)) => (target, data.trim_start()),
                    None => (body, ""),
                };
                children.push(MarkupNode::ProcessingInstruction {
                    target: target.to_string(),
                    data: data.to_string(),
                });
            } else if self.rest.starts_with('<') {
                children.push(MarkupNode::Element(self.parse_element()?));
            } else {
                let (rest, raw) = text_run(self.rest).map_err(|_| self.unexpected("text"))?;
                let text = self.decode(raw)?;
                self.rest = rest;
                children.push(MarkupNode::Text(text));
            }
        }
    }

    fn decode(&self, raw: &str) -> Result<String, ParseError> {
        decode_entities(raw)
            .map(|text| text.into_owned())
            .map_err(|entity| ParseError::UnknownEntity {
                name: entity,
                line: self.line(),
            })
    }
}
