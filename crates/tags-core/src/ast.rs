//! Markup node shape shared by the parser and the normalizer.
//!
//! The normalizer only relies on the minimal DOM-like shape: a node type,
//! a node name, ordered attributes and ordered children.

use smallvec::SmallVec;

/// Node kinds, numbered like the DOM `nodeType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    CData = 4,
    ProcessingInstruction = 7,
    Comment = 8,
}

/// A single `name='value'` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered attribute list. Most elements carry only a few.
pub type AttributeList = SmallVec<[Attribute; 4]>;

/// A parsed markup element.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkupElement {
    /// Element name, case preserved
    pub name: String,
    /// Attributes in document order
    pub attributes: AttributeList,
    /// Child nodes in document order
    pub children: Vec<MarkupNode>,
    /// Source span for error reporting
    pub span: Span,
}

/// Any node that can appear inside an element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

/// Source location in the markup text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl MarkupElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute append.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder-style text child append.
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(MarkupNode::Text(text.to_string()));
        self
    }

    /// Look up an attribute value by exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Child elements only, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &MarkupElement> {
        self.children.iter().filter_map(|c| match c {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text and CDATA of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(t) | MarkupNode::CData(t) => out.push_str(t),
            MarkupNode::Element(e) => collect_text(&e.children, out),
            _ => {}
        }
    }
}

impl MarkupNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            MarkupNode::Element(_) => NodeType::Element,
            MarkupNode::Text(_) => NodeType::Text,
            MarkupNode::CData(_) => NodeType::CData,
            MarkupNode::Comment(_) => NodeType::Comment,
            MarkupNode::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    /// DOM-style `nodeName`.
    pub fn node_name(&self) -> &str {
        match self {
            MarkupNode::Element(e) => &e.name,
            MarkupNode::Text(_) => "#text",
            MarkupNode::CData(_) => "#cdata-section",
            MarkupNode::Comment(_) => "#comment",
            MarkupNode::ProcessingInstruction { target, .. } => target,
        }
    }

    /// DOM-style `nodeValue`; elements have none.
    pub fn node_value(&self) -> Option<&str> {
        match self {
            MarkupNode::Element(_) => None,
            MarkupNode::Text(v) | MarkupNode::CData(v) | MarkupNode::Comment(v) => Some(v),
            MarkupNode::ProcessingInstruction { data, .. } => Some(data),
        }
    }

    pub fn as_element(&self) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MarkupElement> for MarkupNode {
    fn from(element: MarkupElement) -> Self {
        MarkupNode::Element(element)
    }
}
