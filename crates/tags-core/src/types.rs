//! Core value types for Tag trees.

use indexmap::IndexMap;
use serde_json::Value;

/// Handle to a Tag instance owned by a tag arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagId(pub u32);

impl TagId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of a Tag's content, or the result of a normalization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Tag(TagId),
    Text(String),
    Number(f64),
    Bool(bool),
    /// Structured data that is carried along but never rendered.
    Data(Value),
}

impl Node {
    pub fn as_tag(&self) -> Option<TagId> {
        match self {
            Node::Tag(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Node::Tag(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Literal markup text for scalar nodes. Tags and data have none.
    pub fn literal(&self) -> Option<String> {
        match self {
            Node::Text(s) => Some(s.clone()),
            Node::Number(n) => Some(format_number(*n)),
            Node::Bool(b) => Some(b.to_string()),
            Node::Tag(_) | Node::Data(_) => None,
        }
    }

    /// Mirrors script truthiness: empty text, zero, `false` and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Node::Tag(_) => true,
            Node::Text(s) => !s.is_empty(),
            Node::Number(n) => *n != 0.0 && !n.is_nan(),
            Node::Bool(b) => *b,
            Node::Data(v) => !is_falsy_value(v),
        }
    }
}

impl From<TagId> for Node {
    fn from(id: TagId) -> Self {
        Node::Tag(id)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(n)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

/// Nested content of a Tag: an ordered list or a keyed set of named slots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Content {
    Sequence(Vec<Node>),
    Slots(IndexMap<String, Node>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Sequence(Vec::new())
    }
}

impl Content {
    /// A one-element sequence.
    pub fn single(node: Node) -> Self {
        Content::Sequence(vec![node])
    }

    /// Entries in render order (slots in insertion order).
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        let (sequence, slots) = match self {
            Content::Sequence(items) => (Some(items.iter()), None),
            Content::Slots(map) => (None, Some(map.values())),
        };
        sequence
            .into_iter()
            .flatten()
            .chain(slots.into_iter().flatten())
    }

    /// Tag entries in render order.
    pub fn tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.iter().filter_map(Node::as_tag)
    }

    pub fn len(&self) -> usize {
        match self {
            Content::Sequence(items) => items.len(),
            Content::Slots(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positional access; slots are addressed by insertion position.
    pub fn get(&self, index: usize) -> Option<&Node> {
        match self {
            Content::Sequence(items) => items.get(index),
            Content::Slots(map) => map.get_index(index).map(|(_, v)| v),
        }
    }

    /// Named slot access. Sequences have no names.
    pub fn slot(&self, key: &str) -> Option<&Node> {
        match self {
            Content::Sequence(_) => None,
            Content::Slots(map) => map.get(key),
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Content::Sequence(items) => Some(items),
            Content::Slots(_) => None,
        }
    }

    pub fn as_slots(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Content::Sequence(_) => None,
            Content::Slots(map) => Some(map),
        }
    }

    /// Consume into the entries in render order.
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Content::Sequence(items) => items,
            Content::Slots(map) => map.into_values().collect(),
        }
    }
}

/// Format a number the way script engines print them (`1`, not `1.0`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Markup text for a scalar JSON value; `None` for null, arrays and objects.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(format_number)
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Script-style falsiness of a JSON value.
pub fn is_falsy_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
