//! Headless node tree that compiled templates build into.

use std::collections::BTreeMap;

pub mod custom;
pub mod document;
pub mod host;
pub mod schema;

pub use custom::{CustomElement, ElementFactory, define_element, is_defined};
pub use document::{Dispatch, Document, NodeKind};
pub use host::{Host, Listener};
pub use schema::{Namespace, PropertyPath};
pub use weft_core::NodeId;

/// Plain-data snapshot of a subtree, used to compare built trees.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: BTreeMap<String, String>,
}

impl Props {
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }
    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }
}

impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p.attrs.insert(k.to_string(), v.to_string());
        }
        p
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}
pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_matches_hand_built_tree() {
        let mut doc = Document::new();
        let div = doc.create_element("div", Namespace::Html);
        doc.set_attribute(div, "class", "app");
        let hello = doc.create_text("hello");
        let span = doc.create_element("span", Namespace::Html);
        let world = doc.create_text("world");
        doc.append_child(div, hello);
        doc.append_child(span, world);
        doc.append_child(div, span);

        let expected = h(
            "div",
            vec![("class", "app")],
            vec![text("hello"), h("span", (), vec![text("world")])],
        );
        assert_eq!(doc.snapshot(div), expected);
    }
}
