//! Rendering Tags to markup text.
//!
//! Rendering is a template method: [`Tags::render_as`] chains
//! [`render_open`](Tags::render_open), [`render_body`](Tags::render_body) and
//! [`render_close`](Tags::render_close), and a class override can run any of
//! the steps itself after adjusting attributes or content.

use serde_json::Value;
use tags_core::{scalar_text, Node, TagId, TagsError};
use tags_dom::{ElementRef, LiveDocument};

use crate::Tags;

/// Output buffer for one element being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub buf: String,
    /// True until the body has been opened with `>`.
    pub first: bool,
    pub tag: String,
}

impl RenderContext {
    pub fn new(tag: &str) -> Self {
        Self {
            buf: format!("<{}", tag),
            first: true,
            tag: tag.to_string(),
        }
    }
}

/// Attribute keys that become markup attributes.
fn renders_attribute(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_alphabetic()) && key != "tag" && key != "extend"
}

impl Tags {
    /// Render a Tag and its content through its class.
    pub fn render_text(&mut self, id: TagId) -> Result<String, TagsError> {
        let class = self.tag(id)?.class.clone();
        class.render_text.invoke(self, id)
    }

    /// Built-in rendering: the whole element under its output tag name.
    pub(crate) fn default_render_text(&mut self, id: TagId) -> Result<String, TagsError> {
        let name = self.output_tag_name(id)?;
        self.render_as(id, &name)
    }

    /// `htmlTag` when it is a string attribute, otherwise the tag name.
    pub fn output_tag_name(&self, id: TagId) -> Result<String, TagsError> {
        Ok(self.tag(id)?.output_tag_name().to_string())
    }

    /// Render a Tag as an element named `tag_name`.
    pub fn render_as(&mut self, id: TagId, tag_name: &str) -> Result<String, TagsError> {
        let mut cx = self.render_open(id, tag_name)?;
        self.render_body(id, &mut cx)?;
        self.render_close(&mut cx);
        Ok(cx.buf)
    }

    /// Emit `<name` and the attributes, assigning an id first if there is none.
    ///
    /// A synthesized id is not registered; only activation registers ids.
    pub fn render_open(&mut self, id: TagId, tag_name: &str) -> Result<RenderContext, TagsError> {
        if self.tag(id)?.id().is_none() {
            let new_id = self.seq.next_id(&self.options.id_prefix);
            tracing::trace!(tag = %id, id = %new_id, "assigned id while rendering");
            self.tag_mut(id)?
                .attributes
                .insert("id".to_string(), Value::String(new_id));
        }

        let mut cx = RenderContext::new(tag_name);
        for (key, value) in &self.tag(id)?.attributes {
            if !renders_attribute(key) {
                continue;
            }
            if let Some(text) = scalar_text(value) {
                cx.buf.push_str(&format!(" {}='{}'", key, text));
            }
        }
        Ok(cx)
    }

    /// Emit every content item in render order.
    pub fn render_body(&mut self, id: TagId, cx: &mut RenderContext) -> Result<(), TagsError> {
        let items: Vec<Node> = match &self.tag(id)?.content {
            Some(content) => content.iter().cloned().collect(),
            None => return Ok(()),
        };
        for item in &items {
            self.add_content_item(cx, item)?;
        }
        Ok(())
    }

    /// Emit one content item. Any item opens the body; data emits nothing else.
    pub fn add_content_item(&mut self, cx: &mut RenderContext, item: &Node) -> Result<(), TagsError> {
        if cx.first {
            cx.first = false;
            cx.buf.push('>');
        }
        match item {
            Node::Tag(child) => {
                let text = self.render_text(*child)?;
                cx.buf.push_str(&text);
            }
            Node::Data(_) => {}
            other => {
                if let Some(text) = other.literal() {
                    cx.buf.push_str(&text);
                }
            }
        }
        Ok(())
    }

    /// Close the element: `/>` when no body was emitted, else `</name>`.
    pub fn render_close(&self, cx: &mut RenderContext) {
        if cx.first {
            cx.buf.push_str("/>");
        } else {
            cx.buf.push_str(&format!("</{}>", cx.tag));
        }
    }

    /// Render a Tag into a detached live element through its class.
    pub fn render(&mut self, doc: &mut dyn LiveDocument, id: TagId) -> Result<ElementRef, TagsError> {
        let class = self.tag(id)?.class.clone();
        class.render.invoke(self, doc, id)
    }

    /// Built-in rendering: render to text, materialize it and bind the element.
    pub(crate) fn default_render(
        &mut self,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<ElementRef, TagsError> {
        let text = self.render_text(id)?;
        let element = doc.materialize(&text)?;
        self.tag_mut(id)?.element = Some(element);
        tracing::debug!(tag = %id, %element, "rendered tag");
        Ok(element)
    }
}
