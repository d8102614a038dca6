//! The Tags templating engine.
//!
//! Heterogeneous input (markup text, parsed markup, plain JSON objects) is
//! normalized into a tree of Tag instances. Each instance belongs to a class
//! chosen by its tag name, renders itself to markup text, and can later be
//! activated against a live document to bind event handlers.
//!
//! # Example
//!
//! ```
//! use tags_engine::{ClassBuilder, Tags};
//!
//! let mut tags = Tags::new();
//! tags.define(ClassBuilder::new("shout").render_text(|tags, id, sup| {
//!     Ok(sup.render_text(tags, id)?.to_uppercase())
//! }));
//!
//! let id = tags.create("<div>Hello <shout>world</shout></div>").unwrap();
//! assert_eq!(
//!     tags.render_text(id).unwrap(),
//!     "<div id='tag-1'>Hello <SHOUT ID='TAG-2'>WORLD</SHOUT></div>"
//! );
//! ```

mod activate;
mod context;
mod instance;
mod normalizer;
mod options;
mod registry;
mod render;
mod view;

pub use activate::IdRegistry;
pub use context::Tags;
pub use instance::Tag;
pub use normalizer::NormalizeStats;
pub use options::TagsOptions;
pub use registry::{
    ActivateFn, ActivateHook, ClassBuilder, ClassRegistry, Hook, InitFn, InitHook, Method,
    RenderFn, RenderHook, RenderTextFn, RenderTextHook, Super, TagClass, VIEW_CLASS,
};
pub use render::RenderContext;

pub use tags_core::{
    Content, ContentInput, Node, NormalizeError, NormalizerInput, TagId, TagsError,
};
pub use tags_dom::{DomEvent, ElementRef, EventHandler, LiveDocument, MemoryDocument};
