//! WebAssembly bindings for the Tags templating engine.
//!
//! ## Example
//!
//! ```js
//! import { TagsRuntime } from 'tags-wasm';
//!
//! const runtime = new TagsRuntime({ idPrefix: 'app-' });
//!
//! // Render markup or plain data to text
//! runtime.render("<div class='a'>Hello <span>World</span></div>");
//! runtime.renderJson({ tag: 'img', src: 'a.png' });
//!
//! // Render, place after #boot and activate
//! const id = runtime.mountAfter('boot', '<section>Ready</section>');
//! runtime.hasTag(id); // true
//! ```

use serde_json::Value;
use tags_dom::LiveDocument;
use tags_engine::{Node, Tag, Tags, TagsOptions};
use wasm_bindgen::prelude::*;

mod document;
mod types;

pub use document::*;
pub use types::*;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
}

/// The Tags engine interface for JavaScript.
#[wasm_bindgen]
pub struct TagsRuntime {
    tags: Tags,
    document: Option<WebDocument>,
}

#[wasm_bindgen]
impl TagsRuntime {
    /// Create a runtime. `options` may be `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<TagsRuntime, JsError> {
        let options: TagsOptions = if options.is_undefined() || options.is_null() {
            TagsOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| RuntimeError::InvalidOptions(e.to_string()))?
        };
        Ok(Self {
            tags: Tags::with_options(options),
            document: WebDocument::from_window(),
        })
    }

    /// Get the version of the engine.
    #[wasm_bindgen(js_name = version)]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Normalize markup text and render it.
    #[wasm_bindgen]
    pub fn render(&mut self, markup: &str) -> Result<String, JsError> {
        let id = self.tags.create(markup)?;
        Ok(self.tags.render_text(id)?)
    }

    /// Normalize a plain JavaScript value and render it.
    ///
    /// Scalars render as their literal text and `null` as the empty string.
    #[wasm_bindgen(js_name = renderJson)]
    pub fn render_json(&mut self, input: JsValue) -> Result<String, JsError> {
        let value: Value = serde_wasm_bindgen::from_value(input)
            .map_err(|e| RuntimeError::InvalidInput(e.to_string()))?;
        match self.tags.normalize_value(value)? {
            Some(Node::Tag(id)) => Ok(self.tags.render_text(id)?),
            Some(other) => Ok(other.literal().unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    /// Render markup, place it after the element with id `anchor_id` and
    /// activate it. Returns the id of the mounted element.
    #[wasm_bindgen(js_name = mountAfter)]
    pub fn mount_after(&mut self, anchor_id: &str, markup: &str) -> Result<String, JsError> {
        let doc = self.document.as_mut().ok_or(RuntimeError::NoDocument)?;
        let anchor = doc
            .element_by_id(anchor_id)
            .ok_or_else(|| RuntimeError::MissingAnchor(anchor_id.to_string()))?;

        let id = self.tags.create(markup)?;
        let element = self.tags.render(doc, id)?;
        doc.insert_after(anchor, element)?;
        self.tags.activate(doc, id)?;

        Ok(self.tags.get(id).and_then(Tag::id).unwrap_or_default())
    }

    /// Check if an element id was registered by activation.
    #[wasm_bindgen(js_name = hasTag)]
    pub fn has_tag(&self, id: &str) -> bool {
        self.tags.find_tag(id).is_some()
    }

    /// Check if a Tag class is registered.
    #[wasm_bindgen(js_name = hasClass)]
    pub fn has_class(&self, name: &str) -> bool {
        self.tags.registry().contains(name)
    }

    /// Get list of registered class names.
    #[wasm_bindgen(js_name = getClassNames)]
    pub fn get_class_names(&self) -> Vec<String> {
        self.tags.registry().names().map(|s| s.to_string()).collect()
    }

    /// Get normalization counters.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsError> {
        let stats = StatsJs::from(self.tags.stats());
        serde_wasm_bindgen::to_value(&stats)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Forget every Tag instance and registered id. Classes are kept.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.tags.reset();
    }
}

/// Get the engine version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
