//! The engine context that owns every piece of shared state.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use tags_core::{NormalizeError, SequenceAllocator, TagId};

use crate::activate::IdRegistry;
use crate::instance::Tag;
use crate::normalizer::NormalizeStats;
use crate::options::TagsOptions;
use crate::registry::{ClassBuilder, ClassRegistry, TagClass};

/// A Tags engine: class registry, instance arena, id registry, id sequence
/// and normalization statistics.
///
/// Single-threaded; classes and handlers are shared through `Rc`.
pub struct Tags {
    pub(crate) registry: ClassRegistry,
    pub(crate) arena: Vec<Tag>,
    pub(crate) ids: IdRegistry,
    pub(crate) seq: SequenceAllocator,
    pub(crate) stats: NormalizeStats,
    pub(crate) options: TagsOptions,
}

impl Default for Tags {
    fn default() -> Self {
        Self::new()
    }
}

impl Tags {
    pub fn new() -> Self {
        Self::with_options(TagsOptions::default())
    }

    pub fn with_options(options: TagsOptions) -> Self {
        let mut registry = ClassRegistry::new();
        registry.set_default_class(options.default_class.as_deref());
        Self {
            registry,
            arena: Vec::new(),
            ids: IdRegistry::default(),
            seq: SequenceAllocator::new(),
            stats: NormalizeStats::default(),
            options,
        }
    }

    pub fn options(&self) -> &TagsOptions {
        &self.options
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Define and register a Tag class.
    pub fn define(&mut self, builder: ClassBuilder) -> Rc<TagClass> {
        self.registry.define(builder)
    }

    /// Choose the class used for unregistered tag names, or none.
    pub fn set_default_class(&mut self, name: Option<&str>) {
        self.registry.set_default_class(name);
        self.options.default_class = name.map(str::to_string);
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.arena.get(id.index())
    }

    pub fn get_mut(&mut self, id: TagId) -> Option<&mut Tag> {
        self.arena.get_mut(id.index())
    }

    pub(crate) fn tag(&self, id: TagId) -> Result<&Tag, NormalizeError> {
        self.arena.get(id.index()).ok_or(NormalizeError::UnknownTag { id })
    }

    pub(crate) fn tag_mut(&mut self, id: TagId) -> Result<&mut Tag, NormalizeError> {
        self.arena
            .get_mut(id.index())
            .ok_or(NormalizeError::UnknownTag { id })
    }

    pub(crate) fn allocate(
        &mut self,
        name: String,
        class: Rc<TagClass>,
        attributes: IndexMap<String, Value>,
    ) -> TagId {
        let id = TagId(self.arena.len() as u32);
        tracing::trace!(tag = %id, name = %name, class = %class.name, "created tag");
        self.arena.push(Tag::new(name, class, attributes));
        self.stats.created_tags += 1;
        id
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The instance registered under an element id by activation.
    pub fn find_tag(&self, id: &str) -> Option<TagId> {
        self.ids.get(id)
    }

    pub fn stats(&self) -> NormalizeStats {
        self.stats
    }

    /// Last value handed out by the id sequence.
    pub fn sequence(&self) -> u64 {
        self.seq.current()
    }

    /// Drop every instance, registered id and statistic. Classes are kept.
    pub fn reset(&mut self) {
        tracing::debug!(tags = self.arena.len(), ids = self.ids.len(), "resetting tags context");
        self.arena.clear();
        self.ids.clear();
        self.seq.reset();
        self.stats = NormalizeStats::default();
    }
}

impl std::fmt::Debug for Tags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tags")
            .field("classes", &self.registry.len())
            .field("tags", &self.arena.len())
            .field("ids", &self.ids.len())
            .field("sequence", &self.seq.current())
            .field("options", &self.options)
            .finish()
    }
}
