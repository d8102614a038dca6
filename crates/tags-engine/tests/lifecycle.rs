//! End-to-end normalize, render and activate flows against an in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tags_engine::{
    ClassBuilder, Content, ContentInput, DomEvent, LiveDocument, MemoryDocument, Node,
    NormalizerInput, TagId, Tags, VIEW_CLASS,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn as_tag(node: Option<Node>) -> TagId {
    node.and_then(|n| n.as_tag()).expect("expected a tag")
}

#[test]
fn scenario_a_markup_text() {
    let mut tags = Tags::new();
    let div = as_tag(
        tags.normalize("<div class='a'>Hello <span>World</span></div>")
            .unwrap(),
    );

    let tag = tags.get(div).unwrap();
    assert_eq!(tag.tag, "div");
    assert_eq!(tag.attribute_str("class"), Some("a"));

    let content = tag.content.as_ref().unwrap().as_sequence().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0], Node::Text("Hello ".to_string()));

    let span = content[1].as_tag().unwrap();
    let span_tag = tags.get(span).unwrap();
    assert_eq!(span_tag.tag, "span");
    assert_eq!(span_tag.parent, Some(div));
    assert_eq!(
        span_tag.content,
        Some(Content::Sequence(vec![Node::Text("World".to_string())]))
    );
}

#[test]
fn scenario_b_plain_object() {
    let mut tags = Tags::new();
    let div = as_tag(
        tags.normalize_value(json!({"tag": "div", "content": ["x", {"tag": "span", "content": "y"}]}))
            .unwrap(),
    );
    let content = tags.get(div).unwrap().content.clone().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content.get(0), Some(&Node::Text("x".to_string())));
    let span = content.get(1).and_then(Node::as_tag).unwrap();
    assert_eq!(tags.get(span).unwrap().tag, "span");
    assert!(tags.is_tag(content.get(1).unwrap(), &["span"]));
}

#[test]
fn scenario_c_self_closing() {
    let mut tags = Tags::new();
    let id = as_tag(tags.normalize_value(json!({"tag": "img", "src": "a.png"})).unwrap());
    insta::assert_snapshot!(tags.render_text(id).unwrap(), @"<img src='a.png' id='tag-1'/>");
}

#[test]
fn scenario_d_unknown_parent() {
    let mut tags = Tags::new();
    let foo = tags.define(ClassBuilder::new("foo").extends("bar"));
    let parent = foo.parent.as_ref().expect("default parent");
    assert_eq!(parent.name, VIEW_CLASS);
    assert!(tags.registry().contains("FOO"));
    assert!(!tags.registry().contains("bar"));
}

#[test]
fn scenario_e_add_slots_to_empty() {
    let mut tags = Tags::new();
    let id = as_tag(tags.normalize_value(json!({"tag": "layout"})).unwrap());
    assert!(tags.get(id).unwrap().content.is_none());

    let slots = ContentInput::from_value(json!({
        "header": {"tag": "h1", "content": "Title"},
        "footer": "fin"
    }))
    .unwrap();
    tags.add_content(id, slots).unwrap();

    let content = tags.get(id).unwrap().content.clone().unwrap();
    let slots = content.as_slots().unwrap();
    assert_eq!(slots.keys().collect::<Vec<_>>(), vec!["header", "footer"]);
    let header = slots["header"].as_tag().unwrap();
    assert_eq!(tags.get(header).unwrap().tag, "h1");
    assert_eq!(tags.get(header).unwrap().parent, Some(id));
    assert_eq!(slots["footer"], Node::Text("fin".to_string()));
}

#[test]
fn registry_lookup_only_after_activation() {
    init_tracing();
    let mut tags = Tags::new();
    let mut doc = MemoryDocument::new();
    let id = tags.create("<panel><p>body</p></panel>").unwrap();

    let element = tags.render(&mut doc, id).unwrap();
    doc.append_child(MemoryDocument::ROOT, element).unwrap();
    let dom_id = tags.get(id).unwrap().id().unwrap();
    assert_eq!(tags.find_tag(&dom_id), None);

    tags.activate(&mut doc, id).unwrap();
    assert_eq!(tags.find_tag(&dom_id), Some(id));

    let child = tags.children(id).unwrap()[0];
    let child_id = tags.get(child).unwrap().id().unwrap();
    assert_eq!(tags.find_tag(&child_id), Some(child));
    assert!(tags.get(child).unwrap().activated);
}

#[test]
fn mount_sequence_after_anchor() {
    init_tracing();
    let mut doc = MemoryDocument::from_markup(
        "<body><script id='anchor' type='text/custom-tags'/></body>",
    )
    .unwrap();
    let mut tags = Tags::new();

    let clicked = Rc::new(RefCell::new(Vec::new()));
    let log = clicked.clone();
    tags.define(ClassBuilder::new("clicker").init(move |tags, id, sup| {
        sup.init(tags, id)?;
        let log = log.clone();
        tags.on(
            id,
            "click",
            Rc::new(move |event: &DomEvent| log.borrow_mut().push(event.target)),
        )
    }));

    let wrapper = tags
        .create("<wrapper>\n  <clicker>One</clicker>\n  <clicker>Two</clicker>\n</wrapper>")
        .unwrap();

    let mut anchor = doc.element_by_id("anchor").unwrap();
    for child in tags.children(wrapper).unwrap() {
        let element = tags.render(&mut doc, child).unwrap();
        doc.insert_after(anchor, element).unwrap();
        tags.activate(&mut doc, child).unwrap();
        anchor = element;
    }

    let body = doc.parent(anchor).unwrap().unwrap();
    let names: Vec<String> = doc
        .children(body)
        .unwrap()
        .into_iter()
        .map(|el| doc.outer_markup(el).unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "<script id='anchor' type='text/custom-tags'/>",
            "<clicker id='tag-1'>One</clicker>",
            "<clicker id='tag-2'>Two</clicker>",
        ]
    );

    let second = doc.element_by_id("tag-2").unwrap();
    assert_eq!(doc.dispatch(second, "click").unwrap(), 1);
    assert_eq!(*clicked.borrow(), vec![second]);
}

#[test]
fn override_calls_super_chain() {
    let mut tags = Tags::new();
    tags.define(ClassBuilder::new("boxed").render_text(|tags, id, sup| {
        Ok(format!("[{}]", sup.render_text(tags, id)?))
    }));
    tags.define(
        ClassBuilder::new("double-boxed")
            .extends("boxed")
            .render_text(|tags, id, sup| Ok(format!("[{}]", sup.render_text(tags, id)?))),
    );
    let id = tags.create("<double-boxed id='d'/>").unwrap();
    assert_eq!(tags.render_text(id).unwrap(), "[[<double-boxed id='d'/>]]");
}

#[test]
fn custom_activate_runs_default_through_super() {
    let mut doc = MemoryDocument::from_markup("<form id='f'><input id='i'/></form>").unwrap();
    let mut tags = Tags::new();
    let activated = Rc::new(RefCell::new(Vec::new()));
    let seen = activated.clone();
    tags.define(ClassBuilder::new("input").activate(move |tags, doc, id, sup| {
        sup.activate(tags, doc, id)?;
        seen.borrow_mut().push(tags.get(id).and_then(|t| t.id()));
        Ok(())
    }));

    let form = tags.create("<form id='f'><input id='i'/></form>").unwrap();
    tags.activate(&mut doc, form).unwrap();
    assert_eq!(*activated.borrow(), vec![Some("i".to_string())]);
    assert!(tags.find_tag("i").is_some());
}

#[test]
fn idempotent_on_normalized_values() {
    let mut tags = Tags::new();
    let first = tags
        .normalize_value(json!({"tag": "ul", "content": [{"tag": "li"}]}))
        .unwrap();
    let count = tags.len();
    let again = tags.normalize(as_tag(first.clone())).unwrap();
    assert_eq!(again, first);
    assert_eq!(tags.len(), count);
    assert_eq!(tags.normalize(NormalizerInput::from(7.0)).unwrap(), Some(Node::Number(7.0)));
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashSet};

    #[derive(Debug, Clone)]
    enum Gen {
        Text(String),
        Element {
            name: String,
            attributes: BTreeMap<String, String>,
            children: Vec<Gen>,
        },
    }

    fn attributes() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map(
            "[a-z]{1,6}".prop_filter("reserved", |k| !matches!(k.as_str(), "id" | "tag" | "extend" | "el")),
            "[a-z0-9 ]{0,6}",
            0..3,
        )
    }

    fn node() -> impl Strategy<Value = Gen> {
        let leaf = prop_oneof![
            "[a-z ]{1,8}".prop_map(Gen::Text),
            ("[a-z]{1,6}", attributes()).prop_map(|(name, attributes)| Gen::Element {
                name,
                attributes,
                children: Vec::new(),
            }),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            ("[a-z]{1,6}", attributes(), prop::collection::vec(inner, 0..4)).prop_map(
                |(name, attributes, children)| Gen::Element {
                    name,
                    attributes,
                    children,
                },
            )
        })
    }

    fn root() -> impl Strategy<Value = Gen> {
        ("[a-z]{1,6}", attributes(), prop::collection::vec(node(), 0..4)).prop_map(
            |(name, attributes, children)| Gen::Element {
                name,
                attributes,
                children,
            },
        )
    }

    /// Serialize with an explicit id on every element, in renderer format.
    fn write(gen: &Gen, out: &mut String, counter: &mut u32) {
        match gen {
            Gen::Text(text) => out.push_str(text),
            Gen::Element {
                name,
                attributes,
                children,
            } => {
                *counter += 1;
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push_str(&format!(" {}='{}'", key, value));
                }
                out.push_str(&format!(" id='n{}'", counter));
                if children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in children {
                        write(child, out, counter);
                    }
                    out.push_str(&format!("</{}>", name));
                }
            }
        }
    }

    proptest! {
        #[test]
        fn markup_round_trips(tree in root()) {
            let mut source = String::new();
            write(&tree, &mut source, &mut 0);

            let mut tags = Tags::new();
            let id = tags.create(source.as_str()).unwrap();
            prop_assert_eq!(tags.render_text(id).unwrap(), source);
            prop_assert_eq!(tags.sequence(), 0);
        }

        #[test]
        fn synthesized_ids_are_unique(sizes in prop::collection::vec(0usize..4, 1..6)) {
            let mut tags = Tags::new();
            let mut doc = MemoryDocument::new();
            let mut seen = HashSet::new();
            let mut last = 0u64;

            for size in sizes {
                let children: Vec<_> = (0..size).map(|_| json!({"tag": "li"})).collect();
                let id = as_tag(tags.normalize_value(json!({"tag": "ul", "content": children})).unwrap());
                let element = tags.render(&mut doc, id).unwrap();
                doc.append_child(MemoryDocument::ROOT, element).unwrap();
                tags.activate(&mut doc, id).unwrap();

                let mut all = vec![id];
                tags.walk(id, |child, _| all.push(child)).unwrap();
                for tag_id in all {
                    let dom_id = tags.get(tag_id).unwrap().id().unwrap();
                    let n: u64 = dom_id.trim_start_matches("tag-").parse().unwrap();
                    prop_assert!(n > last);
                    last = n;
                    prop_assert!(seen.insert(dom_id.clone()));
                    prop_assert_eq!(tags.find_tag(&dom_id), Some(tag_id));
                }
            }
        }

        #[test]
        fn normalizing_twice_is_a_no_op(
            text in "[a-z ]{0,8}",
            number in -1.0e6f64..1.0e6,
            flag in any::<bool>(),
            depth in 0usize..3,
        ) {
            let mut tags = Tags::new();
            let mut value = json!({"tag": "leaf", "content": [text.clone(), number, flag]});
            for _ in 0..depth {
                value = json!({"tag": "wrap", "content": [value]});
            }

            for input in [
                NormalizerInput::from_value(value).unwrap(),
                NormalizerInput::from(text.as_str()),
                NormalizerInput::from(number),
                NormalizerInput::from(flag),
            ] {
                let first = tags.normalize(input).unwrap();
                let count = tags.len();
                let again_input = match first.clone() {
                    Some(Node::Tag(id)) => NormalizerInput::Tag(id),
                    Some(Node::Text(s)) => NormalizerInput::Text(s),
                    Some(Node::Number(n)) => NormalizerInput::from(n),
                    Some(Node::Bool(b)) => NormalizerInput::from(b),
                    Some(Node::Data(_)) | None => NormalizerInput::Null,
                };
                prop_assert_eq!(tags.normalize(again_input).unwrap(), first);
                prop_assert_eq!(tags.len(), count);
            }
        }
    }
}
