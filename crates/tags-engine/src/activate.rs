//! Binding Tags to live document elements.

use indexmap::IndexMap;
use serde_json::Value;
use tags_core::{ActivateError, TagId, TagsError};
use tags_dom::{ElementRef, EventHandler, LiveDocument};

use crate::Tags;

/// Element id to Tag lookup, filled by activation.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    entries: IndexMap<String, TagId>,
}

impl IdRegistry {
    /// Register `tag` under `id`, returning the instance it replaced.
    pub fn register(&mut self, id: String, tag: TagId) -> Option<TagId> {
        self.entries.insert(id, tag)
    }

    pub fn get(&self, id: &str) -> Option<TagId> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Tags {
    /// Activate a Tag through its class: bind handlers, register its id and
    /// activate its Tag content.
    ///
    /// A Tag is activated at most once; later calls are no-ops. A failed
    /// activation can be retried unless it already bound handlers.
    pub fn activate(&mut self, doc: &mut dyn LiveDocument, id: TagId) -> Result<(), TagsError> {
        let tag = self.tag_mut(id)?;
        if tag.activated {
            tracing::debug!(tag = %id, "already activated");
            return Ok(());
        }
        tag.activated = true;
        let class = tag.class.clone();

        let result = class.activate.invoke(self, doc, id);
        if result.is_err() {
            if let Some(tag) = self.arena.get_mut(id.index()) {
                tag.activated = tag.handlers_bound;
            }
        }
        result
    }

    /// Built-in activation.
    pub(crate) fn default_activate(
        &mut self,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<(), TagsError> {
        self.locate_subtree(&*doc, id)?;
        let element = match self.tag(id)?.element {
            Some(element) => element,
            None => return Err(ActivateError::Unlocatable { id }.into()),
        };

        let existing_id = self.tag(id)?.id();
        let dom_id = match existing_id {
            Some(dom_id) => dom_id,
            None => {
                let dom_id = self.seq.next_id(&self.options.id_prefix);
                doc.set_attribute(element, "id", &dom_id)?;
                self.tag_mut(id)?
                    .attributes
                    .insert("id".to_string(), Value::String(dom_id.clone()));
                dom_id
            }
        };

        let handlers: Vec<(String, EventHandler)> = self
            .tag(id)?
            .handlers
            .iter()
            .map(|(event, handler)| (event.clone(), handler.clone()))
            .collect();
        self.tag_mut(id)?.handlers_bound = true;
        for (event, handler) in handlers {
            doc.bind(element, &event, handler)?;
        }

        if let Some(previous) = self.ids.register(dom_id.clone(), id) {
            if previous != id {
                tracing::warn!(id = %dom_id, %previous, current = %id, "element id re-registered");
            }
        }
        tracing::debug!(tag = %id, id = %dom_id, %element, "activated tag");

        let children = self.tag(id)?.child_tags();
        for child in children {
            self.activate(doc, child)?;
        }
        Ok(())
    }

    /// Bind a live element to every Tag in the subtree that will be
    /// activated, so a missing element fails before anything is bound.
    fn locate_subtree(&mut self, doc: &dyn LiveDocument, id: TagId) -> Result<(), TagsError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let tag = self.tag(current)?;
            if current != id && tag.activated {
                continue;
            }
            let children = tag.child_tags();
            if tag.element.is_none() {
                let element = self.locate(doc, current)?;
                self.tag_mut(current)?.element = Some(element);
            }
            stack.extend(children);
        }
        Ok(())
    }

    /// Find the live element for a Tag by its `el` selector, else by its id.
    fn locate(&self, doc: &dyn LiveDocument, id: TagId) -> Result<ElementRef, TagsError> {
        let tag = self.tag(id)?;
        let selector = match (tag.attribute_str("el"), tag.id()) {
            (Some(selector), _) => selector.to_string(),
            (None, Some(dom_id)) => {
                return doc.element_by_id(&dom_id).ok_or_else(|| {
                    ActivateError::MissingLiveElement {
                        selector: format!("#{}", dom_id),
                    }
                    .into()
                });
            }
            (None, None) => return Err(ActivateError::Unlocatable { id }.into()),
        };
        doc.query_selector(&selector)?
            .ok_or_else(|| ActivateError::MissingLiveElement { selector }.into())
    }
}
