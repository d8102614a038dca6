//! Closed set of inputs accepted by the normalizer.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::ast::MarkupElement;
use crate::errors::NormalizeError;
use crate::types::TagId;

/// Scalar leaves that pass through normalization unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
}

/// Everything `normalize` knows how to turn into a Tag tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizerInput {
    /// Absent value; normalizes to nothing.
    Null,
    /// An instance that has already been normalized.
    Tag(TagId),
    /// Plain text, or markup text when it starts with `<` after trimming.
    Text(String),
    /// An externally parsed markup element.
    Markup(MarkupElement),
    /// A plain data object selecting its class through its `tag` key.
    Object(Map<String, Value>),
    Scalar(Scalar),
}

impl NormalizerInput {
    /// Convert a JSON value. Bare arrays have no tag selector and are rejected.
    pub fn from_value(value: Value) -> Result<Self, NormalizeError> {
        Ok(match value {
            Value::Null => NormalizerInput::Null,
            Value::Bool(b) => NormalizerInput::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                NormalizerInput::Scalar(Scalar::Number(n.as_f64().unwrap_or(f64::NAN)))
            }
            Value::String(s) => NormalizerInput::Text(s),
            Value::Object(map) => NormalizerInput::Object(map),
            Value::Array(_) => {
                return Err(NormalizeError::MalformedInput {
                    reason: "an array cannot be normalized into a single tag".to_string(),
                })
            }
        })
    }

    /// Script-style falsiness: null, empty text, zero and `false`.
    pub fn is_falsy(&self) -> bool {
        match self {
            NormalizerInput::Null => true,
            NormalizerInput::Text(s) => s.is_empty(),
            NormalizerInput::Scalar(Scalar::Number(n)) => *n == 0.0 || n.is_nan(),
            NormalizerInput::Scalar(Scalar::Bool(b)) => !b,
            NormalizerInput::Tag(_) | NormalizerInput::Markup(_) | NormalizerInput::Object(_) => {
                false
            }
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizerInput::Null => "null",
            NormalizerInput::Tag(_) => "tag",
            NormalizerInput::Text(_) => "text",
            NormalizerInput::Markup(_) => "markup",
            NormalizerInput::Object(_) => "object",
            NormalizerInput::Scalar(_) => "scalar",
        }
    }
}

impl TryFrom<Value> for NormalizerInput {
    type Error = NormalizeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        NormalizerInput::from_value(value)
    }
}

impl From<TagId> for NormalizerInput {
    fn from(id: TagId) -> Self {
        NormalizerInput::Tag(id)
    }
}

impl From<&str> for NormalizerInput {
    fn from(s: &str) -> Self {
        NormalizerInput::Text(s.to_string())
    }
}

impl From<String> for NormalizerInput {
    fn from(s: String) -> Self {
        NormalizerInput::Text(s)
    }
}

impl From<MarkupElement> for NormalizerInput {
    fn from(element: MarkupElement) -> Self {
        NormalizerInput::Markup(element)
    }
}

impl From<Map<String, Value>> for NormalizerInput {
    fn from(map: Map<String, Value>) -> Self {
        NormalizerInput::Object(map)
    }
}

impl From<f64> for NormalizerInput {
    fn from(n: f64) -> Self {
        NormalizerInput::Scalar(Scalar::Number(n))
    }
}

impl From<i64> for NormalizerInput {
    fn from(n: i64) -> Self {
        NormalizerInput::Scalar(Scalar::Number(n as f64))
    }
}

impl From<bool> for NormalizerInput {
    fn from(b: bool) -> Self {
        NormalizerInput::Scalar(Scalar::Bool(b))
    }
}

impl<T: Into<NormalizerInput>> From<Option<T>> for NormalizerInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(NormalizerInput::Null)
    }
}

/// Content handed to `add_content`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentInput {
    /// Entries appended to a sequence.
    List(Vec<NormalizerInput>),
    /// Named slots set on a keyed content map.
    Slots(IndexMap<String, NormalizerInput>),
    /// A single entry.
    Item(NormalizerInput),
}

impl ContentInput {
    /// Convert a JSON value: arrays become lists, objects become slots.
    pub fn from_value(value: Value) -> Result<Self, NormalizeError> {
        Ok(match value {
            Value::Array(items) => ContentInput::List(
                items
                    .into_iter()
                    .map(NormalizerInput::from_value)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(map) => ContentInput::Slots(
                map.into_iter()
                    .map(|(k, v)| NormalizerInput::from_value(v).map(|input| (k, input)))
                    .collect::<Result<IndexMap<_, _>, _>>()?,
            ),
            other => ContentInput::Item(NormalizerInput::from_value(other)?),
        })
    }
}

impl TryFrom<Value> for ContentInput {
    type Error = NormalizeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ContentInput::from_value(value)
    }
}

impl From<NormalizerInput> for ContentInput {
    fn from(input: NormalizerInput) -> Self {
        ContentInput::Item(input)
    }
}

impl From<TagId> for ContentInput {
    fn from(id: TagId) -> Self {
        ContentInput::Item(NormalizerInput::Tag(id))
    }
}

impl From<&str> for ContentInput {
    fn from(s: &str) -> Self {
        ContentInput::Item(NormalizerInput::from(s))
    }
}

impl From<String> for ContentInput {
    fn from(s: String) -> Self {
        ContentInput::Item(NormalizerInput::Text(s))
    }
}

impl From<MarkupElement> for ContentInput {
    fn from(element: MarkupElement) -> Self {
        ContentInput::Item(NormalizerInput::Markup(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_variants() {
        assert_eq!(NormalizerInput::from_value(json!(null)).unwrap(), NormalizerInput::Null);
        assert_eq!(
            NormalizerInput::from_value(json!("hi")).unwrap(),
            NormalizerInput::Text("hi".to_string())
        );
        assert_eq!(
            NormalizerInput::from_value(json!(2)).unwrap(),
            NormalizerInput::Scalar(Scalar::Number(2.0))
        );
        assert!(matches!(
            NormalizerInput::from_value(json!({"tag": "div"})).unwrap(),
            NormalizerInput::Object(_)
        ));
        assert!(matches!(
            NormalizerInput::from_value(json!([1, 2])),
            Err(NormalizeError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_falsy_inputs() {
        assert!(NormalizerInput::Null.is_falsy());
        assert!(NormalizerInput::from("").is_falsy());
        assert!(NormalizerInput::from(0.0).is_falsy());
        assert!(NormalizerInput::from(false).is_falsy());
        assert!(!NormalizerInput::from("0").is_falsy());
        assert!(!NormalizerInput::Tag(TagId(0)).is_falsy());
    }

    #[test]
    fn test_content_input_shapes() {
        assert!(matches!(
            ContentInput::from_value(json!(["a", {"tag": "b"}])).unwrap(),
            ContentInput::List(items) if items.len() == 2
        ));
        assert!(matches!(
            ContentInput::from_value(json!({"header": "H"})).unwrap(),
            ContentInput::Slots(map) if map.contains_key("header")
        ));
        assert!(matches!(ContentInput::from("x"), ContentInput::Item(_)));
        assert!(ContentInput::from_value(json!([[1]])).is_err());
    }

    #[test]
    fn test_option_input() {
        let none: Option<&str> = None;
        assert_eq!(NormalizerInput::from(none), NormalizerInput::Null);
        assert_eq!(NormalizerInput::from(Some("x")), NormalizerInput::Text("x".to_string()));
    }
}
