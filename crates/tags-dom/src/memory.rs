//! Arena-backed in-memory document.

use indexmap::IndexMap;
use tags_core::{DocumentError, MarkupElement, MarkupNode};

use crate::document::{ElementRef, LiveDocument};
use crate::event::{DomEvent, EventHandler};
use crate::selector::Selector;

enum DomChild {
    Element(ElementRef),
    Text(String),
}

struct ElementNode {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<DomChild>,
    parent: Option<ElementRef>,
    handlers: Vec<(String, EventHandler)>,
}

impl ElementNode {
    fn new(name: &str, parent: Option<ElementRef>) -> Self {
        Self {
            name: name.to_string(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent,
            handlers: Vec::new(),
        }
    }
}

/// A document held entirely in memory.
///
/// Elements live in an arena and are never freed; detaching an element only
/// unlinks it from its parent. The arena root is an unnamed document node
/// that selectors never match.
pub struct MemoryDocument {
    nodes: Vec<ElementNode>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Handle of the document node.
    pub const ROOT: ElementRef = ElementRef(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![ElementNode::new("#document", None)],
        }
    }

    /// Parse `markup` and attach its root element to the document.
    pub fn from_markup(markup: &str) -> Result<Self, DocumentError> {
        let mut doc = Self::new();
        let element = doc.materialize(markup)?;
        doc.append_child(Self::ROOT, element)?;
        Ok(doc)
    }

    /// Number of elements ever created, the document node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn node(&self, element: ElementRef) -> Result<&ElementNode, DocumentError> {
        self.nodes
            .get(element.0 as usize)
            .ok_or(DocumentError::UnknownElement { handle: element.0 })
    }

    fn node_mut(&mut self, element: ElementRef) -> Result<&mut ElementNode, DocumentError> {
        self.nodes
            .get_mut(element.0 as usize)
            .ok_or(DocumentError::UnknownElement { handle: element.0 })
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(
        &mut self,
        parent: ElementRef,
        child: ElementRef,
    ) -> Result<(), DocumentError> {
        self.node(parent)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(DomChild::Element(child));
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlink `element` from its parent, if it has one.
    pub fn detach(&mut self, element: ElementRef) -> Result<(), DocumentError> {
        let Some(parent) = self.node(element)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?
            .children
            .retain(|c| !matches!(c, DomChild::Element(e) if *e == element));
        self.node_mut(element)?.parent = None;
        Ok(())
    }

    /// True when `element` is reachable from the document node.
    pub fn is_attached(&self, element: ElementRef) -> bool {
        let mut current = Some(element);
        while let Some(el) = current {
            if el == Self::ROOT {
                return true;
            }
            current = self.nodes.get(el.0 as usize).and_then(|n| n.parent);
        }
        false
    }

    pub fn tag_name(&self, element: ElementRef) -> Result<&str, DocumentError> {
        Ok(&self.node(element)?.name)
    }

    pub fn parent(&self, element: ElementRef) -> Result<Option<ElementRef>, DocumentError> {
        Ok(self.node(element)?.parent)
    }

    /// Element children in order.
    pub fn children(&self, element: ElementRef) -> Result<Vec<ElementRef>, DocumentError> {
        Ok(self
            .node(element)?
            .children
            .iter()
            .filter_map(|c| match c {
                DomChild::Element(e) => Some(*e),
                DomChild::Text(_) => None,
            })
            .collect())
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, element: ElementRef) -> Result<String, DocumentError> {
        let mut out = String::new();
        self.collect_text(element, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, element: ElementRef, out: &mut String) -> Result<(), DocumentError> {
        for child in &self.node(element)?.children {
            match child {
                DomChild::Text(text) => out.push_str(text),
                DomChild::Element(e) => self.collect_text(*e, out)?,
            }
        }
        Ok(())
    }

    /// Serialize the subtree rooted at `element`.
    pub fn outer_markup(&self, element: ElementRef) -> Result<String, DocumentError> {
        let mut out = String::new();
        self.write_markup(element, &mut out)?;
        Ok(out)
    }

    fn write_markup(&self, element: ElementRef, out: &mut String) -> Result<(), DocumentError> {
        let node = self.node(element)?;
        out.push('<');
        out.push_str(&node.name);
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {}='{}'", name, value));
        }
        if node.children.is_empty() {
            out.push_str("/>");
            return Ok(());
        }
        out.push('>');
        for child in &node.children {
            match child {
                DomChild::Text(text) => out.push_str(text),
                DomChild::Element(e) => self.write_markup(*e, out)?,
            }
        }
        out.push_str(&format!("</{}>", node.name));
        Ok(())
    }

    /// Attached elements in document order, the document node excluded.
    fn attached(&self) -> Vec<ElementRef> {
        let mut order = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(current) = stack.pop() {
            if current != Self::ROOT {
                order.push(current);
            }
            if let Some(node) = self.nodes.get(current.0 as usize) {
                for child in node.children.iter().rev() {
                    if let DomChild::Element(e) = child {
                        stack.push(*e);
                    }
                }
            }
        }
        order
    }

    fn find(&self, selector: &Selector) -> Option<ElementRef> {
        self.attached().into_iter().find(|el| {
            let node = &self.nodes[el.0 as usize];
            selector.matches(&node.name, |name| {
                node.attributes.get(name).map(String::as_str)
            })
        })
    }

    /// Number of handlers bound to `element` for `event`.
    pub fn handler_count(&self, element: ElementRef, event: &str) -> usize {
        self.nodes
            .get(element.0 as usize)
            .map(|n| n.handlers.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Run every handler bound to `element` for `event`, in binding order.
    ///
    /// Returns the number of handlers invoked. Events do not bubble.
    pub fn dispatch(&self, element: ElementRef, event: &str) -> Result<usize, DocumentError> {
        let handlers: Vec<EventHandler> = self
            .node(element)?
            .handlers
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| handler.clone())
            .collect();
        let dom_event = DomEvent::new(event, element);
        for handler in &handlers {
            handler(&dom_event);
        }
        tracing::trace!(%element, event, count = handlers.len(), "dispatched event");
        Ok(handlers.len())
    }

    fn build(&mut self, markup: &MarkupElement, parent: Option<ElementRef>) -> ElementRef {
        let handle = ElementRef(self.nodes.len() as u64);
        let mut node = ElementNode::new(&markup.name, parent);
        for attr in &markup.attributes {
            node.attributes.insert(attr.name.clone(), attr.value.clone());
        }
        self.nodes.push(node);

        let mut children = Vec::with_capacity(markup.children.len());
        for child in &markup.children {
            match child {
                MarkupNode::Element(element) => {
                    children.push(DomChild::Element(self.build(element, Some(handle))));
                }
                MarkupNode::Text(text) | MarkupNode::CData(text) => {
                    children.push(DomChild::Text(text.clone()));
                }
                MarkupNode::Comment(_) | MarkupNode::ProcessingInstruction { .. } => {}
            }
        }
        self.nodes[handle.0 as usize].children = children;
        handle
    }
}

impl LiveDocument for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.find(&Selector::id(id))
    }

    fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>, DocumentError> {
        let selector = Selector::parse(selector)?;
        Ok(self.find(&selector))
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>, DocumentError> {
        Ok(self.node(element)?.attributes.get(name).cloned())
    }

    fn set_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        self.node_mut(element)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn bind(
        &mut self,
        element: ElementRef,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DocumentError> {
        self.node_mut(element)?
            .handlers
            .push((event.to_string(), handler));
        Ok(())
    }

    fn materialize(&mut self, markup: &str) -> Result<ElementRef, DocumentError> {
        let root = tags_parser::parse_markup(markup)?;
        let handle = self.build(&root, None);
        tracing::debug!(element = %handle, name = %root.name, "materialized markup");
        Ok(handle)
    }

    fn insert_after(
        &mut self,
        anchor: ElementRef,
        element: ElementRef,
    ) -> Result<(), DocumentError> {
        self.node(element)?;
        let parent = self
            .node(anchor)?
            .parent
            .ok_or(DocumentError::Detached { handle: anchor.0 })?;
        self.detach(element)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|c| matches!(c, DomChild::Element(e) if *e == anchor))
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        siblings.insert(position, DomChild::Element(element));
        self.node_mut(element)?.parent = Some(parent);
        Ok(())
    }
}
