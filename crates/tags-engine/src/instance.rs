//! Tag instances.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use tags_core::{is_falsy_value, scalar_text, Content, TagId};
use tags_dom::{ElementRef, EventHandler};

use crate::registry::TagClass;

/// One Tag instance, owned by the [`Tags`](crate::Tags) arena.
pub struct Tag {
    /// Name that selected the class.
    pub tag: String,
    pub class: Rc<TagClass>,
    /// Attributes in insertion order. The id lives here under `"id"`.
    pub attributes: IndexMap<String, Value>,
    pub content: Option<Content>,
    pub parent: Option<TagId>,
    pub handlers: IndexMap<String, EventHandler>,
    /// Live element, once rendered or activated.
    pub element: Option<ElementRef>,
    pub activated: bool,
    /// Set once activation has bound handlers to `element`.
    pub(crate) handlers_bound: bool,
}

impl Tag {
    pub(crate) fn new(tag: String, class: Rc<TagClass>, attributes: IndexMap<String, Value>) -> Self {
        Self {
            tag,
            class,
            attributes,
            content: None,
            parent: None,
            handlers: IndexMap::new(),
            element: None,
            activated: false,
            handlers_bound: false,
        }
    }

    /// The id, if one is set and non-empty.
    pub fn id(&self) -> Option<String> {
        self.attributes
            .get("id")
            .filter(|v| !is_falsy_value(v))
            .and_then(scalar_text)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// String value of an attribute.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Name of the element this Tag renders as: `htmlTag` if set, else `tag`.
    pub fn output_tag_name(&self) -> &str {
        self.attribute_str("htmlTag").unwrap_or(self.tag.as_str())
    }

    /// Tag children in content order.
    pub fn child_tags(&self) -> Vec<TagId> {
        self.content.iter().flat_map(Content::tags).collect()
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("tag", &self.tag)
            .field("class", &self.class.name)
            .field("attributes", &self.attributes)
            .field("content", &self.content)
            .field("parent", &self.parent)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("element", &self.element)
            .field("activated", &self.activated)
            .finish()
    }
}
