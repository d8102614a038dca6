//! The document surface activation talks to.

use tags_core::DocumentError;

use crate::event::EventHandler;

/// Opaque handle to an element owned by a [`LiveDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(pub u64);

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element {}", self.0)
    }
}

/// A live document that Tags can be activated against.
///
/// Lookups only see elements attached to the document. Elements returned by
/// [`materialize`](LiveDocument::materialize) stay detached until they are
/// placed with [`insert_after`](LiveDocument::insert_after).
pub trait LiveDocument {
    /// First attached element whose `id` attribute equals `id`.
    fn element_by_id(&self, id: &str) -> Option<ElementRef>;

    /// First attached element matching `selector`, in document order.
    fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>, DocumentError>;

    fn attribute(&self, element: ElementRef, name: &str) -> Result<Option<String>, DocumentError>;

    fn set_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError>;

    /// Attach `handler` to `element` for events named `event`.
    fn bind(
        &mut self,
        element: ElementRef,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DocumentError>;

    /// Build a detached element tree from markup text and return its root.
    fn materialize(&mut self, markup: &str) -> Result<ElementRef, DocumentError>;

    /// Place `element` directly after `anchor`, under the same parent.
    fn insert_after(&mut self, anchor: ElementRef, element: ElementRef)
        -> Result<(), DocumentError>;
}
