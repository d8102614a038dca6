//! Convenience operations on Tag instances: type tests, handlers, the class
//! list and tree traversal.

use serde_json::Value;
use tags_core::{Node, TagId, TagsError};
use tags_dom::{EventHandler, LiveDocument};

use crate::instance::Tag;
use crate::Tags;

impl Tags {
    /// True if `node` is a Tag, and when `names` is non-empty, one whose
    /// `tag` equals one of them exactly.
    pub fn is_tag(&self, node: &Node, names: &[&str]) -> bool {
        let Some(tag) = node.as_tag().and_then(|id| self.get(id)) else {
            return false;
        };
        names.is_empty() || names.iter().any(|name| *name == tag.tag)
    }

    /// Register a handler to be bound when the Tag is activated.
    pub fn on(&mut self, id: TagId, event: &str, handler: EventHandler) -> Result<(), TagsError> {
        let tag = self.tag_mut(id)?;
        if tag.activated {
            tracing::debug!(tag = %id, event, "handler added after activation is not bound");
        }
        tag.handlers.insert(event.to_string(), handler);
        Ok(())
    }

    pub fn has_class(&self, id: TagId, class: &str) -> Result<bool, TagsError> {
        Ok(class_list(self.tag(id)?).iter().any(|c| c == class))
    }

    /// Add names to the `class` attribute, keeping order and skipping duplicates.
    pub fn add_class(
        &mut self,
        doc: &mut dyn LiveDocument,
        id: TagId,
        classes: &[&str],
    ) -> Result<(), TagsError> {
        let mut list = class_list(self.tag(id)?);
        for class in classes {
            if !list.iter().any(|c| c == class) {
                list.push(class.to_string());
            }
        }
        self.store_class_list(doc, id, list)
    }

    /// Remove names from the `class` attribute.
    pub fn remove_class(
        &mut self,
        doc: &mut dyn LiveDocument,
        id: TagId,
        classes: &[&str],
    ) -> Result<(), TagsError> {
        let mut list = class_list(self.tag(id)?);
        list.retain(|c| !classes.contains(&c.as_str()));
        self.store_class_list(doc, id, list)
    }

    fn store_class_list(
        &mut self,
        doc: &mut dyn LiveDocument,
        id: TagId,
        list: Vec<String>,
    ) -> Result<(), TagsError> {
        let text = list.join(" ");
        let tag = self.tag_mut(id)?;
        tag.attributes
            .insert("class".to_string(), Value::String(text.clone()));
        if let Some(element) = tag.element {
            doc.set_attribute(element, "class", &text)?;
        }
        Ok(())
    }

    /// Visit every descendant Tag in pre-order.
    pub fn walk(&self, id: TagId, mut visit: impl FnMut(TagId, &Tag)) -> Result<(), TagsError> {
        let mut stack = self.tag(id)?.child_tags();
        stack.reverse();
        while let Some(current) = stack.pop() {
            let tag = self.tag(current)?;
            visit(current, tag);
            stack.extend(tag.child_tags().into_iter().rev());
        }
        Ok(())
    }

    /// Tag children in content order.
    pub fn children(&self, id: TagId) -> Result<Vec<TagId>, TagsError> {
        Ok(self.tag(id)?.child_tags())
    }

    pub fn parent(&self, id: TagId) -> Result<Option<TagId>, TagsError> {
        Ok(self.tag(id)?.parent)
    }
}

fn class_list(tag: &Tag) -> Vec<String> {
    tag.attribute_str("class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
