//! Live document interface for the Tags engine.
//!
//! Activation needs very little from a document: look an element up by id or
//! selector, read and write its attributes, and bind event handlers. This
//! crate defines that surface as the [`LiveDocument`] trait and ships
//! [`MemoryDocument`], an arena-backed implementation used for tests and
//! server-side rendering.

mod document;
mod event;
mod memory;
mod selector;

pub use document::{ElementRef, LiveDocument};
pub use event::{DomEvent, EventHandler};
pub use memory::MemoryDocument;
pub use selector::{AttributeMatch, Selector};
