//! Class registry for storing and looking up Tag classes.
//!
//! A class is a record of overridable methods. Defining a class extends a
//! parent member by member: every method the builder supplies wraps the
//! parent's method, which the override can still reach through [`Super`].
//! Methods the builder leaves out are shared with the parent.

use std::rc::Rc;

use indexmap::IndexMap;
use tags_core::{NormalizeError, TagId, TagsError};
use tags_dom::{ElementRef, LiveDocument};

use crate::Tags;

/// Name of the built-in root class.
pub const VIEW_CLASS: &str = "view";

/// Marker for one overridable operation.
pub trait Hook: 'static {
    type Fn: ?Sized;
}

/// `init` runs after attributes are assigned and before content is normalized.
pub struct InitHook;
pub struct RenderTextHook;
/// `render` turns a Tag into a detached live element.
pub struct RenderHook;
pub struct ActivateHook;

pub type InitFn = dyn Fn(&mut Tags, TagId, &Super<'_, InitHook>) -> Result<(), TagsError>;
pub type RenderTextFn =
    dyn Fn(&mut Tags, TagId, &Super<'_, RenderTextHook>) -> Result<String, TagsError>;
pub type RenderFn = dyn Fn(
    &mut Tags,
    &mut dyn LiveDocument,
    TagId,
    &Super<'_, RenderHook>,
) -> Result<ElementRef, TagsError>;
pub type ActivateFn = dyn Fn(
    &mut Tags,
    &mut dyn LiveDocument,
    TagId,
    &Super<'_, ActivateHook>,
) -> Result<(), TagsError>;

impl Hook for InitHook {
    type Fn = InitFn;
}

impl Hook for RenderTextHook {
    type Fn = RenderTextFn;
}

impl Hook for RenderHook {
    type Fn = RenderFn;
}

impl Hook for ActivateHook {
    type Fn = ActivateFn;
}

/// One method implementation plus the implementation it overrides.
pub struct Method<H: Hook> {
    imp: Rc<H::Fn>,
    overridden: Option<Rc<Method<H>>>,
}

impl<H: Hook> Method<H> {
    fn root(imp: Rc<H::Fn>) -> Rc<Self> {
        Rc::new(Self {
            imp,
            overridden: None,
        })
    }

    fn overriding(imp: Rc<H::Fn>, parent: &Rc<Method<H>>) -> Rc<Self> {
        Rc::new(Self {
            imp,
            overridden: Some(parent.clone()),
        })
    }

    /// Number of implementations in the override chain, this one included.
    pub fn depth(&self) -> usize {
        1 + self.overridden.as_ref().map_or(0, |m| m.depth())
    }

    fn super_handle(&self) -> Super<'_, H> {
        Super(self.overridden.as_deref())
    }
}

impl Method<InitHook> {
    pub(crate) fn invoke(&self, tags: &mut Tags, id: TagId) -> Result<(), TagsError> {
        (self.imp)(tags, id, &self.super_handle())
    }
}

impl Method<RenderTextHook> {
    pub(crate) fn invoke(&self, tags: &mut Tags, id: TagId) -> Result<String, TagsError> {
        (self.imp)(tags, id, &self.super_handle())
    }
}

impl Method<RenderHook> {
    pub(crate) fn invoke(
        &self,
        tags: &mut Tags,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<ElementRef, TagsError> {
        (self.imp)(tags, doc, id, &self.super_handle())
    }
}

impl Method<ActivateHook> {
    pub(crate) fn invoke(
        &self,
        tags: &mut Tags,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<(), TagsError> {
        (self.imp)(tags, doc, id, &self.super_handle())
    }
}

/// Handle to the implementation an override replaced.
///
/// With nothing above it, a call falls back to the built-in behavior.
pub struct Super<'a, H: Hook>(Option<&'a Method<H>>);

impl Super<'_, InitHook> {
    pub fn init(&self, tags: &mut Tags, id: TagId) -> Result<(), TagsError> {
        match self.0 {
            Some(method) => method.invoke(tags, id),
            None => Ok(()),
        }
    }
}

impl Super<'_, RenderTextHook> {
    pub fn render_text(&self, tags: &mut Tags, id: TagId) -> Result<String, TagsError> {
        match self.0 {
            Some(method) => method.invoke(tags, id),
            None => tags.default_render_text(id),
        }
    }
}

impl Super<'_, RenderHook> {
    pub fn render(
        &self,
        tags: &mut Tags,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<ElementRef, TagsError> {
        match self.0 {
            Some(method) => method.invoke(tags, doc, id),
            None => tags.default_render(doc, id),
        }
    }
}

impl Super<'_, ActivateHook> {
    pub fn activate(
        &self,
        tags: &mut Tags,
        doc: &mut dyn LiveDocument,
        id: TagId,
    ) -> Result<(), TagsError> {
        match self.0 {
            Some(method) => method.invoke(tags, doc, id),
            None => tags.default_activate(doc, id),
        }
    }
}

/// A registered Tag class. Immutable once defined.
pub struct TagClass {
    pub name: String,
    pub parent: Option<Rc<TagClass>>,
    pub init: Rc<Method<InitHook>>,
    pub render_text: Rc<Method<RenderTextHook>>,
    pub render: Rc<Method<RenderHook>>,
    pub activate: Rc<Method<ActivateHook>>,
}

impl TagClass {
    /// The built-in `view` class.
    fn view() -> Self {
        let init: Rc<InitFn> = Rc::new(|_, _, _| Ok(()));
        let render_text: Rc<RenderTextFn> = Rc::new(|tags, id, _| tags.default_render_text(id));
        let render: Rc<RenderFn> = Rc::new(|tags, doc, id, _| tags.default_render(doc, id));
        let activate: Rc<ActivateFn> =
            Rc::new(|tags, doc, id, _| tags.default_activate(doc, id));
        Self {
            name: VIEW_CLASS.to_string(),
            parent: None,
            init: Method::<InitHook>::root(init),
            render_text: Method::<RenderTextHook>::root(render_text),
            render: Method::<RenderHook>::root(render),
            activate: Method::<ActivateHook>::root(activate),
        }
    }

    /// True if this class is `name` or extends it, compared case-insensitively.
    pub fn is_a(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.name.eq_ignore_ascii_case(name) {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }
}

impl std::fmt::Debug for TagClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .finish_non_exhaustive()
    }
}

/// Builder for defining a Tag class.
pub struct ClassBuilder {
    name: String,
    extends: Option<String>,
    init: Option<Rc<InitFn>>,
    render_text: Option<Rc<RenderTextFn>>,
    render: Option<Rc<RenderFn>>,
    activate: Option<Rc<ActivateFn>>,
}

impl ClassBuilder {
    /// Start a class for the given tag name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extends: None,
            init: None,
            render_text: None,
            render: None,
            activate: None,
        }
    }

    /// Extend the named class instead of the default class.
    pub fn extends(mut self, parent: &str) -> Self {
        self.extends = Some(parent.to_string());
        self
    }

    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tags, TagId, &Super<'_, InitHook>) -> Result<(), TagsError> + 'static,
    {
        let imp: Rc<InitFn> = Rc::new(f);
        self.init = Some(imp);
        self
    }

    pub fn render_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tags, TagId, &Super<'_, RenderTextHook>) -> Result<String, TagsError> + 'static,
    {
        let imp: Rc<RenderTextFn> = Rc::new(f);
        self.render_text = Some(imp);
        self
    }

    /// Override how the Tag becomes a live element. The override usually
    /// calls `sup.render` and then adjusts the returned element.
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tags, &mut dyn LiveDocument, TagId, &Super<'_, RenderHook>) -> Result<ElementRef, TagsError>
            + 'static,
    {
        let imp: Rc<RenderFn> = Rc::new(f);
        self.render = Some(imp);
        self
    }

    pub fn activate<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tags, &mut dyn LiveDocument, TagId, &Super<'_, ActivateHook>) -> Result<(), TagsError>
            + 'static,
    {
        let imp: Rc<ActivateFn> = Rc::new(f);
        self.activate = Some(imp);
        self
    }
}

/// Registry of Tag classes keyed by upper-cased name.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: IndexMap<String, Rc<TagClass>>,
    default_class: Option<String>,
    /// Method source for classes defined while no default class is set.
    base: Rc<TagClass>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// A registry holding only the built-in `view` class, which is the default.
    pub fn new() -> Self {
        let base = Rc::new(TagClass::view());
        let mut classes = IndexMap::new();
        classes.insert(key(VIEW_CLASS), base.clone());
        Self {
            classes,
            default_class: Some(key(VIEW_CLASS)),
            base,
        }
    }

    /// Define a class and register it, replacing any class of the same name.
    pub fn define(&mut self, builder: ClassBuilder) -> Rc<TagClass> {
        let parent = builder
            .extends
            .as_deref()
            .and_then(|name| self.get(name))
            .or_else(|| self.default_class());
        if let (Some(wanted), None) = (&builder.extends, &parent) {
            tracing::debug!(class = %builder.name, extends = %wanted, "parent class not found");
        }
        let source = parent.clone().unwrap_or_else(|| self.base.clone());

        let class = Rc::new(TagClass {
            name: builder.name.clone(),
            parent,
            init: match builder.init {
                Some(imp) => Method::overriding(imp, &source.init),
                None => source.init.clone(),
            },
            render_text: match builder.render_text {
                Some(imp) => Method::overriding(imp, &source.render_text),
                None => source.render_text.clone(),
            },
            render: match builder.render {
                Some(imp) => Method::overriding(imp, &source.render),
                None => source.render.clone(),
            },
            activate: match builder.activate {
                Some(imp) => Method::overriding(imp, &source.activate),
                None => source.activate.clone(),
            },
        });

        tracing::debug!(
            class = %class.name,
            parent = class.parent.as_ref().map(|p| p.name.as_str()).unwrap_or("-"),
            "defined tag class"
        );
        if self.classes.insert(key(&builder.name), class.clone()).is_some() {
            tracing::debug!(class = %builder.name, "replaced existing tag class");
        }
        class
    }

    /// The class registered under `name`, or the default class.
    pub fn resolve(&self, name: &str) -> Result<Rc<TagClass>, NormalizeError> {
        self.get(name)
            .or_else(|| self.default_class())
            .ok_or_else(|| NormalizeError::UnresolvedClass {
                name: name.to_string(),
            })
    }

    /// Choose the fallback class by name, or clear it with `None`.
    pub fn set_default_class(&mut self, name: Option<&str>) {
        self.default_class = name.map(key);
    }

    pub fn default_class(&self) -> Option<Rc<TagClass>> {
        self.default_class
            .as_deref()
            .and_then(|name| self.classes.get(name))
            .cloned()
    }

    /// Get a class by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Rc<TagClass>> {
        self.classes.get(&key(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&key(name))
    }

    /// Registered names (upper-cased) in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn key(name: &str) -> String {
    name.to_uppercase()
}
