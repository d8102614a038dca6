//! [`LiveDocument`] over the browser DOM.

use std::cell::RefCell;

use tags_core::DocumentError;
use tags_dom::{DomEvent, ElementRef, EventHandler, LiveDocument};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlTemplateElement};

/// A browser document. Handles index into the elements seen so far.
pub struct WebDocument {
    document: Document,
    elements: RefCell<Vec<Element>>,
    // Listeners are dropped with the document, which unhooks them from JS.
    listeners: Vec<Closure<dyn FnMut(Event)>>,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            elements: RefCell::new(Vec::new()),
            listeners: Vec::new(),
        }
    }

    /// The document of the global window, if there is one.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The DOM element behind a handle.
    pub fn element(&self, handle: ElementRef) -> Result<Element, DocumentError> {
        self.elements
            .borrow()
            .get(handle.0 as usize)
            .cloned()
            .ok_or(DocumentError::UnknownElement { handle: handle.0 })
    }

    fn handle(&self, element: Element) -> ElementRef {
        let mut elements = self.elements.borrow_mut();
        if let Some(index) = elements
            .iter()
            .position(|known| known.is_same_node(Some(&element)))
        {
            return ElementRef(index as u64);
        }
        elements.push(element);
        ElementRef(elements.len() as u64 - 1)
    }
}

fn host_error(err: JsValue) -> DocumentError {
    DocumentError::Host {
        reason: err.as_string().unwrap_or_else(|| format!("{:?}", err)),
    }
}

impl LiveDocument for WebDocument {
    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.handle(element))
    }

    fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>, DocumentError> {
        let found = self
            .document
            .query_selector(selector)
            .map_err(|_| DocumentError::InvalidSelector {
                selector: selector.to_string(),
            })?;
        Ok(found.map(|element| self.handle(element)))
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>, DocumentError> {
        Ok(self.element(element)?.get_attribute(name))
    }

    fn set_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        self.element(element)?
            .set_attribute(name, value)
            .map_err(host_error)
    }

    fn bind(
        &mut self,
        element: ElementRef,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DocumentError> {
        let target = self.element(element)?;
        let listener = Closure::<dyn FnMut(Event)>::new(move |raw: Event| {
            let dom_event = DomEvent::new(raw.type_(), element).with_timestamp(raw.time_stamp());
            handler(&dom_event);
        });
        target
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
            .map_err(host_error)?;
        self.listeners.push(listener);
        Ok(())
    }

    fn materialize(&mut self, markup: &str) -> Result<ElementRef, DocumentError> {
        let template: HtmlTemplateElement = self
            .document
            .create_element("template")
            .map_err(host_error)?
            .dyn_into()
            .map_err(|_| DocumentError::Host {
                reason: "template elements are not supported".to_string(),
            })?;
        template.set_inner_html(markup);
        let element = template
            .content()
            .first_element_child()
            .ok_or_else(|| DocumentError::Markup {
                reason: "markup produced no element".to_string(),
            })?;
        Ok(self.handle(element))
    }

    fn insert_after(&mut self, anchor: ElementRef, element: ElementRef) -> Result<(), DocumentError> {
        let anchor_element = self.element(anchor)?;
        if anchor_element.parent_node().is_none() {
            return Err(DocumentError::Detached { handle: anchor.0 });
        }
        let placed = self.element(element)?;
        anchor_element.after_with_node_1(&placed).map_err(host_error)
    }
}
