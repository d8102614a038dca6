//! Structural normalization: heterogeneous input to a Tag tree.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tags_core::{
    is_falsy_value, Content, ContentInput, MarkupElement, MarkupNode, Node, NormalizeError,
    NormalizerInput, Scalar, TagId, TagsError,
};

use crate::Tags;

/// Cumulative normalization counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Time spent parsing markup text.
    pub parse_time: Duration,
    /// Time spent normalizing, parsing excluded.
    pub work_time: Duration,
    pub parsed_documents: u64,
    pub created_tags: u64,
}

// `Instant::now` panics on wasm32-unknown-unknown, so timing is skipped there.
#[cfg(not(target_arch = "wasm32"))]
type Clock = Option<std::time::Instant>;
#[cfg(target_arch = "wasm32")]
type Clock = Option<()>;

#[cfg(not(target_arch = "wasm32"))]
fn start_clock() -> Clock {
    Some(std::time::Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_clock() -> Clock {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn elapsed(clock: Clock) -> Duration {
    clock.map(|started| started.elapsed()).unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn elapsed(_clock: Clock) -> Duration {
    Duration::ZERO
}

impl Tags {
    /// Turn `input` into a Tag tree, or pass a leaf value through.
    ///
    /// Already-normalized Tags come back unchanged; `Null` yields `None`.
    pub fn normalize(&mut self, input: impl Into<NormalizerInput>) -> Result<Option<Node>, TagsError> {
        let input = input.into();
        self.timed(|tags| tags.normalize_at(input, 0))
    }

    /// Run `f`, adding its time outside of markup parsing to `work_time`.
    fn timed<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let clock = start_clock();
        let parse_before = self.stats.parse_time;

        let result = f(self);

        let parse_spent = self.stats.parse_time.saturating_sub(parse_before);
        self.stats.work_time += elapsed(clock).saturating_sub(parse_spent);
        result
    }

    /// Normalize a JSON value. Bare arrays are rejected.
    pub fn normalize_value(&mut self, value: Value) -> Result<Option<Node>, TagsError> {
        let input = NormalizerInput::from_value(value)?;
        self.normalize(input)
    }

    /// Normalize input that must produce a Tag.
    pub fn create(&mut self, input: impl Into<NormalizerInput>) -> Result<TagId, TagsError> {
        let input = input.into();
        let kind = input.kind();
        match self.normalize(input)? {
            Some(Node::Tag(id)) => Ok(id),
            _ => Err(NormalizeError::MalformedInput {
                reason: format!("{} input did not produce a tag", kind),
            }
            .into()),
        }
    }

    fn normalize_at(&mut self, input: NormalizerInput, depth: u32) -> Result<Option<Node>, TagsError> {
        match input {
            NormalizerInput::Null => Ok(None),
            NormalizerInput::Tag(id) => {
                self.tag(id)?;
                Ok(Some(Node::Tag(id)))
            }
            NormalizerInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.starts_with('<') {
                    let root = self.parse_timed(trimmed)?;
                    self.normalize_markup(&root, depth).map(|id| Some(Node::Tag(id)))
                } else {
                    Ok(Some(Node::Text(text)))
                }
            }
            NormalizerInput::Markup(element) => {
                self.normalize_markup(&element, depth).map(|id| Some(Node::Tag(id)))
            }
            NormalizerInput::Object(map) => {
                self.normalize_object(map, depth).map(|id| Some(Node::Tag(id)))
            }
            NormalizerInput::Scalar(Scalar::Number(n)) => Ok(Some(Node::Number(n))),
            NormalizerInput::Scalar(Scalar::Bool(b)) => Ok(Some(Node::Bool(b))),
        }
    }

    fn parse_timed(&mut self, source: &str) -> Result<MarkupElement, TagsError> {
        let clock = start_clock();
        let root = tags_parser::parse_markup(source)?;
        self.stats.parse_time += elapsed(clock);
        self.stats.parsed_documents += 1;
        Ok(root)
    }

    fn check_depth(&self, depth: u32) -> Result<(), NormalizeError> {
        if depth > self.options.max_depth {
            return Err(NormalizeError::MaxDepthExceeded {
                depth: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn normalize_markup(&mut self, element: &MarkupElement, depth: u32) -> Result<TagId, TagsError> {
        self.check_depth(depth)?;
        let name = element.attribute("tag").unwrap_or(element.name.as_str()).to_string();
        let class = self.registry.resolve(&name)?;
        let attributes = element
            .attributes
            .iter()
            .filter(|attr| attr.name != "tag")
            .map(|attr| (attr.name.clone(), Value::String(attr.value.clone())))
            .collect();

        let id = self.allocate(name, class.clone(), attributes);
        class.init.invoke(self, id)?;

        let mut nodes = Vec::with_capacity(element.children.len());
        for child in &element.children {
            match child {
                MarkupNode::Element(child_element) => {
                    let child_id = self.normalize_markup(child_element, depth + 1)?;
                    self.tag_mut(child_id)?.parent = Some(id);
                    nodes.push(Node::Tag(child_id));
                }
                MarkupNode::Text(text) | MarkupNode::CData(text) => {
                    nodes.push(Node::Text(text.clone()));
                }
                MarkupNode::Comment(_) | MarkupNode::ProcessingInstruction { .. } => {}
            }
        }
        self.tag_mut(id)?.content = Some(Content::Sequence(nodes));
        Ok(id)
    }

    fn normalize_object(&mut self, map: Map<String, Value>, depth: u32) -> Result<TagId, TagsError> {
        self.check_depth(depth)?;
        let name = match map.get("tag") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(NormalizeError::MalformedInput {
                    reason: format!("'tag' must be a string, found {}", other),
                }
                .into())
            }
            None => {
                return Err(NormalizeError::MalformedInput {
                    reason: "object has no 'tag' key".to_string(),
                }
                .into())
            }
        };
        let class = self.registry.resolve(&name)?;

        let mut content = None;
        let mut attributes = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            match key.as_str() {
                "tag" => {}
                "content" => content = Some(value),
                _ => {
                    attributes.insert(key, value);
                }
            }
        }

        let id = self.allocate(name, class.clone(), attributes);
        class.init.invoke(self, id)?;

        let content = match content {
            None => None,
            Some(value) if is_falsy_value(&value) => None,
            Some(Value::Array(items)) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    let input = NormalizerInput::from_value(item)?;
                    nodes.push(self.normalize_entry(id, input, depth + 1)?);
                }
                Some(Content::Sequence(nodes))
            }
            Some(Value::Object(slots)) => {
                let mut normalized = IndexMap::with_capacity(slots.len());
                for (key, value) in slots {
                    let input = NormalizerInput::from_value(value)?;
                    normalized.insert(key, self.normalize_entry(id, input, depth + 1)?);
                }
                Some(Content::Slots(normalized))
            }
            Some(value) => {
                let input = NormalizerInput::from_value(value)?;
                Some(Content::single(self.normalize_entry(id, input, depth + 1)?))
            }
        };
        self.tag_mut(id)?.content = content;
        Ok(id)
    }

    /// Normalize one content entry of `parent`. Null keeps its slot as data.
    fn normalize_entry(
        &mut self,
        parent: TagId,
        input: NormalizerInput,
        depth: u32,
    ) -> Result<Node, TagsError> {
        let node = self
            .normalize_at(input, depth)?
            .unwrap_or(Node::Data(Value::Null));
        if let Node::Tag(child) = node {
            if self.is_self_or_ancestor(child, parent)? {
                return Err(NormalizeError::MalformedInput {
                    reason: format!("tag {} cannot be added inside itself or a descendant", child),
                }
                .into());
            }
            self.tag_mut(child)?.parent = Some(parent);
        }
        Ok(node)
    }

    /// True if `candidate` is `id` or one of its ancestors.
    fn is_self_or_ancestor(&self, candidate: TagId, id: TagId) -> Result<bool, TagsError> {
        let mut current = Some(id);
        while let Some(tag_id) = current {
            if tag_id == candidate {
                return Ok(true);
            }
            current = self.tag(tag_id)?.parent;
        }
        Ok(false)
    }

    /// Normalize `to_add` and merge it into the content of `id`.
    ///
    /// Lists append to a sequence, slots set keys on a keyed map, and a
    /// single falsy item is ignored. A sequence receiving slots is re-keyed
    /// by position first; keyed content receiving a list or item keeps its
    /// values in order.
    pub fn add_content(&mut self, id: TagId, to_add: impl Into<ContentInput>) -> Result<(), TagsError> {
        let to_add = to_add.into();
        self.timed(|tags| tags.merge_content(id, to_add))
    }

    fn merge_content(&mut self, id: TagId, to_add: ContentInput) -> Result<(), TagsError> {
        self.tag(id)?;
        match to_add {
            ContentInput::List(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    nodes.push(self.normalize_entry(id, item, 1)?);
                }
                let tag = self.tag_mut(id)?;
                let mut existing = tag
                    .content
                    .take()
                    .map(Content::into_nodes)
                    .unwrap_or_default();
                existing.extend(nodes);
                tag.content = Some(Content::Sequence(existing));
            }
            ContentInput::Slots(entries) => {
                let mut normalized = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    normalized.push((key, self.normalize_entry(id, value, 1)?));
                }
                let tag = self.tag_mut(id)?;
                let mut slots = match tag.content.take() {
                    None => IndexMap::new(),
                    Some(Content::Slots(slots)) => slots,
                    Some(Content::Sequence(items)) => items
                        .into_iter()
                        .enumerate()
                        .map(|(index, node)| (index.to_string(), node))
                        .collect(),
                };
                slots.extend(normalized);
                tag.content = Some(Content::Slots(slots));
            }
            ContentInput::Item(input) => {
                if input.is_falsy() {
                    tracing::trace!(tag = %id, "ignoring falsy content");
                    return Ok(());
                }
                let node = self.normalize_entry(id, input, 1)?;
                let tag = self.tag_mut(id)?;
                match tag.content {
                    Some(Content::Sequence(ref mut items)) => items.push(node),
                    Some(Content::Slots(ref mut slots)) => {
                        let key = (slots.len()..)
                            .map(|n| n.to_string())
                            .find(|key| !slots.contains_key(key))
                            .unwrap_or_default();
                        slots.insert(key, node);
                    }
                    None => tag.content = Some(Content::single(node)),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassBuilder;
    use serde_json::json;

    fn tag_of(node: Option<Node>) -> TagId {
        node.and_then(|n| n.as_tag()).expect("expected a tag")
    }

    #[test]
    fn test_leaves_pass_through() {
        let mut tags = Tags::new();
        assert_eq!(tags.normalize(NormalizerInput::Null).unwrap(), None);
        assert_eq!(tags.normalize("  plain ").unwrap(), Some(Node::Text("  plain ".into())));
        assert_eq!(tags.normalize(3.5).unwrap(), Some(Node::Number(3.5)));
        assert_eq!(tags.normalize(false).unwrap(), Some(Node::Bool(false)));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_markup_text() {
        let mut tags = Tags::new();
        let id = tag_of(tags.normalize("  <div class='a'>Hi <b>x</b><!-- c --></div>").unwrap());
        let div = tags.get(id).unwrap();
        assert_eq!(div.tag, "div");
        assert_eq!(div.attribute_str("class"), Some("a"));
        let content = div.content.as_ref().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content.get(0), Some(&Node::Text("Hi ".into())));
        let b = content.get(1).and_then(Node::as_tag).unwrap();
        assert_eq!(tags.get(b).unwrap().parent, Some(id));
        assert_eq!(tags.stats().parsed_documents, 1);
        assert_eq!(tags.stats().created_tags, 2);
    }

    #[test]
    fn test_markup_tag_attribute_overrides_name() {
        let mut tags = Tags::new();
        tags.define(ClassBuilder::new("card"));
        let id = tag_of(tags.normalize("<div tag='card' title='t'/>").unwrap());
        let tag = tags.get(id).unwrap();
        assert_eq!(tag.tag, "card");
        assert_eq!(tag.class.name, "card");
        assert!(tag.attribute("tag").is_none());
        assert_eq!(tag.content, Some(Content::Sequence(vec![])));
    }

    #[test]
    fn test_object_content_shapes() {
        let mut tags = Tags::new();
        let id = tag_of(
            tags.normalize_value(json!({
                "tag": "ul", "class": "list",
                "content": [{"tag": "li", "content": "one"}, null, 2]
            }))
            .unwrap(),
        );
        let ul = tags.get(id).unwrap();
        assert!(ul.attribute("content").is_none());
        let items = ul.content.as_ref().unwrap().as_sequence().unwrap().to_vec();
        assert_eq!(items[1], Node::Data(Value::Null));
        assert_eq!(items[2], Node::Number(2.0));
        let li = items[0].as_tag().unwrap();
        assert_eq!(tags.get(li).unwrap().parent, Some(id));
        assert_eq!(
            tags.get(li).unwrap().content,
            Some(Content::single(Node::Text("one".into())))
        );

        let slotted = tag_of(
            tags.normalize_value(json!({"tag": "panel", "content": {"header": "H", "body": {"tag": "p"}}}))
                .unwrap(),
        );
        let content = tags.get(slotted).unwrap().content.clone().unwrap();
        assert_eq!(content.slot("header"), Some(&Node::Text("H".into())));
        assert!(content.slot("body").unwrap().is_tag());

        let empty = tag_of(tags.normalize_value(json!({"tag": "br", "content": 0})).unwrap());
        assert!(tags.get(empty).unwrap().content.is_none());
    }

    #[test]
    fn test_object_errors() {
        let mut tags = Tags::new();
        assert!(matches!(
            tags.normalize_value(json!({"class": "x"})),
            Err(TagsError::Normalize(NormalizeError::MalformedInput { .. }))
        ));
        assert!(matches!(
            tags.normalize_value(json!({"tag": 3})),
            Err(TagsError::Normalize(NormalizeError::MalformedInput { .. }))
        ));
        assert!(matches!(
            tags.normalize_value(json!({"tag": "a", "content": [[1]]})),
            Err(TagsError::Normalize(NormalizeError::MalformedInput { .. }))
        ));
        assert!(matches!(tags.normalize("<a><b></a>"), Err(TagsError::Parse(_))));
    }

    #[test]
    fn test_already_normalized_is_unchanged() {
        let mut tags = Tags::new();
        let id = tag_of(tags.normalize("<p/>").unwrap());
        assert_eq!(tags.normalize(id).unwrap(), Some(Node::Tag(id)));
        assert_eq!(tags.len(), 1);
        assert!(matches!(
            tags.normalize(TagId(99)),
            Err(TagsError::Normalize(NormalizeError::UnknownTag { .. }))
        ));
    }

    #[test]
    fn test_init_runs_before_content() {
        let mut tags = Tags::new();
        tags.define(ClassBuilder::new("counted").init(|tags, id, sup| {
            sup.init(tags, id)?;
            let tag = tags.get_mut(id).expect("tag exists during init");
            let seen_content = tag.content.is_some();
            tag.set_attribute("contentSeen", seen_content);
            Ok(())
        }));
        let id = tag_of(tags.normalize_value(json!({"tag": "counted", "content": ["x"]})).unwrap());
        let tag = tags.get(id).unwrap();
        assert_eq!(tag.attribute("contentSeen"), Some(&json!(false)));
        assert_eq!(tag.content.as_ref().map(Content::len), Some(1));
    }

    #[test]
    fn test_max_depth() {
        let mut tags = Tags::with_options(crate::TagsOptions::default().with_max_depth(2));
        assert!(tags.normalize("<a><b><c/></b></a>").is_ok());
        assert!(matches!(
            tags.normalize("<a><b><c><d/></c></b></a>"),
            Err(TagsError::Normalize(NormalizeError::MaxDepthExceeded { depth: 2 }))
        ));
    }

    #[test]
    fn test_unresolved_class_without_default() {
        let mut tags = Tags::new();
        tags.set_default_class(None);
        assert!(matches!(
            tags.normalize("<div/>"),
            Err(TagsError::Normalize(NormalizeError::UnresolvedClass { .. }))
        ));
        assert!(tags.normalize("<view/>").is_ok());
    }

    #[test]
    fn test_add_content_policy() {
        let mut tags = Tags::new();
        let id = tags.create("<div/>").unwrap();

        tags.add_content(id, "a").unwrap();
        tags.add_content(id, ContentInput::List(vec!["b".into(), "<i/>".into()])).unwrap();
        tags.add_content(id, "").unwrap();
        let content = tags.get(id).unwrap().content.clone().unwrap();
        assert_eq!(content.len(), 3);
        let i = content.get(2).and_then(Node::as_tag).unwrap();
        assert_eq!(tags.get(i).unwrap().parent, Some(id));

        let mut slots = IndexMap::new();
        slots.insert("extra".to_string(), NormalizerInput::from("e"));
        tags.add_content(id, ContentInput::Slots(slots)).unwrap();
        let keys: Vec<String> = tags.get(id).unwrap().content.as_ref().unwrap()
            .as_slots().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["0", "1", "2", "extra"]);

        tags.add_content(id, "tail").unwrap();
        let content = tags.get(id).unwrap().content.clone().unwrap();
        assert_eq!(content.slot("4"), Some(&Node::Text("tail".into())));

        tags.add_content(id, ContentInput::List(vec!["z".into()])).unwrap();
        let content = tags.get(id).unwrap().content.clone().unwrap();
        assert_eq!(content.len(), 6);
        assert_eq!(content.get(5), Some(&Node::Text("z".into())));
        assert!(content.as_sequence().is_some());
    }

    #[test]
    fn test_add_content_to_empty() {
        let mut tags = Tags::new();
        let id = tags.create("<span/>").unwrap();
        tags.get_mut(id).unwrap().content = None;
        tags.add_content(id, "x").unwrap();
        assert_eq!(
            tags.get(id).unwrap().content,
            Some(Content::single(Node::Text("x".into())))
        );

        let other = tags.create(json!({"tag": "section"}).as_object().cloned().unwrap()).unwrap();
        let mut slots = IndexMap::new();
        slots.insert("main".to_string(), NormalizerInput::Tag(id));
        tags.add_content(other, ContentInput::Slots(slots)).unwrap();
        assert_eq!(tags.get(id).unwrap().parent, Some(other));
    }

    #[test]
    fn test_parse_and_work_time_are_separate() {
        let mut tags = Tags::new();
        tags.normalize("<div><p>text</p></div>").unwrap();
        let first = tags.stats();
        assert_eq!(first.parsed_documents, 1);

        let rows: Vec<_> = (0..50).map(|i| json!({"tag": "tr", "content": [i]})).collect();
        tags.normalize_value(json!({"tag": "table", "content": rows})).unwrap();
        let second = tags.stats();
        assert!(second.work_time > first.work_time);
        assert_eq!(second.parse_time, first.parse_time);
        assert_eq!(second.parsed_documents, 1);
        assert_eq!(second.created_tags, first.created_tags + 51);
    }

    #[test]
    fn test_add_content_counts_work_time() {
        let mut tags = Tags::new();
        let id = tags.create(json!({"tag": "list"}).as_object().cloned().unwrap()).unwrap();
        let before = tags.stats();
        let items: Vec<NormalizerInput> = (0..50)
            .map(|i| NormalizerInput::from_value(json!({"tag": "item", "n": i})).unwrap())
            .collect();
        tags.add_content(id, ContentInput::List(items)).unwrap();
        let after = tags.stats();
        assert!(after.work_time > before.work_time);
        assert_eq!(after.created_tags, before.created_tags + 50);
        assert_eq!(after.parsed_documents, before.parsed_documents);
    }

    #[test]
    fn test_add_content_rejects_cycles() {
        let mut tags = Tags::new();
        let root = tags.create("<a><b><c/></b></a>").unwrap();
        let b = tags.children(root).unwrap()[0];
        let c = tags.children(b).unwrap()[0];

        for target in [root, b] {
            assert!(matches!(
                tags.add_content(c, target),
                Err(TagsError::Normalize(NormalizeError::MalformedInput { .. }))
            ));
        }
        assert!(matches!(
            tags.add_content(c, c),
            Err(TagsError::Normalize(NormalizeError::MalformedInput { .. }))
        ));
        assert_eq!(tags.get(c).unwrap().parent, Some(b));
        assert_eq!(tags.get(root).unwrap().parent, None);
        assert!(tags.get(c).unwrap().content.as_ref().map_or(true, Content::is_empty));

        let other = tags.create("<d/>").unwrap();
        tags.add_content(c, other).unwrap();
        assert_eq!(tags.get(other).unwrap().parent, Some(c));
    }

    #[test]
    fn test_item_into_slots_skips_taken_keys() {
        let mut tags = Tags::new();
        let id = tags.create("<grid/>").unwrap();
        let mut slots = IndexMap::new();
        slots.insert("1".to_string(), NormalizerInput::from("one"));
        tags.add_content(id, ContentInput::Slots(slots)).unwrap();
        assert_eq!(
            tags.get(id).unwrap().content.as_ref().unwrap().as_slots().unwrap().len(),
            1
        );

        tags.add_content(id, "two").unwrap();
        tags.add_content(id, "three").unwrap();
        let content = tags.get(id).unwrap().content.clone().unwrap();
        assert_eq!(content.slot("1"), Some(&Node::Text("one".into())));
        assert_eq!(content.slot("2"), Some(&Node::Text("two".into())));
        assert_eq!(content.slot("3"), Some(&Node::Text("three".into())));
    }
}
