use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::rc::Rc;

use weft_core::{EvalError, Event, NodeId, Value};

use crate::custom::{self, CustomElement};
use crate::host::{Host, Listener};
use crate::schema::{Namespace, PropertyPath, Reflect, reflection};
use crate::{Props, VNode};

pub struct ElementData {
    pub tag: String,
    pub namespace: Namespace,
    pub attrs: BTreeMap<String, String>,
    pub props: BTreeMap<String, Value>,
    listeners: Vec<(String, Listener)>,
}

pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Outcome of [`Document::dispatch`].
#[derive(Debug, Default, PartialEq)]
pub struct Dispatch {
    pub invoked: usize,
    pub errors: Vec<EvalError>,
}

type SharedElement = Rc<RefCell<Box<dyn CustomElement>>>;

/// Headless node tree. Owns every node; hands out [`NodeId`] handles.
#[derive(Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    custom: HashMap<NodeId, SharedElement>,
    // Custom elements inside `connect`, innermost last.
    connecting: Vec<NodeId>,
    // Declared-property writes held back until their element has connected.
    deferred: Vec<(NodeId, PropertyPath, Value)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.element(node).map(|el| el.namespace)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    /// Read a property. Custom elements answer for the properties they declare.
    pub fn property(&self, node: NodeId, path: &str) -> Option<Value> {
        if let Some(el) = self.declaring_element(node, path) {
            let el = el.try_borrow().ok()?;
            return el.property(path);
        }
        self.element(node)?.props.get(path).cloned()
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(_) => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn is_custom(&self, node: NodeId) -> bool {
        self.custom.contains_key(&node)
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.element(node).map(|el| el.listeners.len()).unwrap_or(0)
    }

    /// Deliver an event to the listeners of `target` and then of each of its
    /// ancestors. Listener failures are collected, not propagated.
    pub fn dispatch(&self, target: NodeId, kind: &str, detail: Value) -> Dispatch {
        let mut listeners: Vec<Listener> = Vec::new();
        let mut cur = Some(target);
        while let Some(node) = cur {
            if let Some(el) = self.element(node) {
                listeners.extend(
                    el.listeners
                        .iter()
                        .filter(|(k, _)| k == kind)
                        .map(|(_, l)| l.clone()),
                );
            }
            cur = self.parent(node);
        }

        let event = Event::new(kind, target, detail);
        let mut outcome = Dispatch::default();
        for listener in listeners {
            outcome.invoked += 1;
            if let Err(e) = listener(&event) {
                log::warn!("listener for '{kind}' on {target} failed: {e}");
                outcome.errors.push(e);
            }
        }
        outcome
    }

    /// Structural snapshot. Properties appear as `.name` entries next to the
    /// attributes.
    pub fn snapshot(&self, node: NodeId) -> VNode {
        match self.kind(node) {
            Some(NodeKind::Element(el)) => {
                let mut props = Props::new();
                for (k, v) in &el.attrs {
                    props = props.set(k.as_str(), v.as_str());
                }
                for (k, v) in &el.props {
                    props = props.set(format!(".{k}"), v.to_string());
                }
                let children = self
                    .children(node)
                    .iter()
                    .map(|c| self.snapshot(*c))
                    .collect();
                VNode::Element {
                    tag: el.tag.clone(),
                    props,
                    children,
                }
            }
            Some(NodeKind::Text(t)) => VNode::Text(t.clone()),
            None => VNode::Text(String::new()),
        }
    }

    /// Serialize as markup. Properties that do not reflect to an attribute are
    /// written as `.name="value"`.
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Element(el)) => {
                let _ = write!(out, "<{}", el.tag);
                for (k, v) in &el.attrs {
                    let _ = write!(out, " {}=\"{}\"", k, escape(v));
                }
                for (k, v) in el.props.iter().filter(|(k, _)| reflection(k).is_none()) {
                    if !matches!(v, Value::Callback(_)) {
                        let _ = write!(out, " .{}=\"{}\"", k, escape(&v.to_string()));
                    }
                }
                out.push('>');
                for child in self.children(node) {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
            Some(NodeKind::Text(t)) => out.push_str(&escape(t)),
            None => {}
        }
    }

    fn custom_element(&self, node: NodeId) -> Option<SharedElement> {
        self.custom.get(&node).cloned()
    }

    /// Hand `el` the writes its own template made to it while connecting.
    fn apply_deferred(&mut self, node: NodeId, el: &SharedElement) {
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|(n, _, _)| *n == node);
        self.deferred = rest;
        for (_, path, value) in mine {
            match el.try_borrow_mut() {
                Ok(mut el) => el.set_property(&path, value),
                Err(_) => log::warn!("property {path} on busy custom element {node} dropped"),
            }
        }
    }

    /// The custom element behind `node`, if its definition declares `name`.
    fn declaring_element(&self, node: NodeId, name: &str) -> Option<SharedElement> {
        let el = self.custom.get(&node)?;
        let declared = custom::defined_properties(self.tag(node)?)?;
        declared.iter().any(|p| p == name).then(|| el.clone())
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

impl Host for Document {
    fn create_element(&mut self, tag: &str, namespace: Namespace) -> NodeId {
        let id = self.push(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            namespace,
            attrs: BTreeMap::new(),
            props: BTreeMap::new(),
            listeners: Vec::new(),
        }));
        if namespace.is_html() {
            if let Some(instance) = custom::instantiate(tag) {
                let shared: SharedElement = Rc::new(RefCell::new(instance));
                self.custom.insert(id, shared.clone());
                self.connecting.push(id);
                let connected = shared.borrow_mut().connect(self, id);
                self.connecting.pop();
                if let Err(e) = connected {
                    log::warn!("connecting <{tag}> {id} failed: {e}");
                }
                self.apply_deferred(id, &shared);
            }
        }
        id
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            log::warn!("append_child({parent}, {child}): unknown node");
            return;
        }
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn set_property(&mut self, node: NodeId, path: &PropertyPath, value: Value) {
        if let Some(el) = self.declaring_element(node, path.head()) {
            match el.try_borrow_mut() {
                Ok(mut el) => el.set_property(path, value),
                Err(_) if self.connecting.contains(&node) => {
                    log::trace!("property {path} on connecting element {node} deferred");
                    self.deferred.push((node, path.clone(), value));
                }
                Err(_) => log::warn!("property {path} on busy custom element {node} dropped"),
            }
            return;
        }
        let key = path.to_string();
        let reflect = reflection(&key);
        let Some(el) = self.element_mut(node) else {
            return;
        };
        match reflect {
            Some(Reflect::String(attr)) => match &value {
                Value::Null => {
                    el.attrs.remove(attr);
                }
                v => {
                    el.attrs.insert(attr.to_string(), v.to_string());
                }
            },
            Some(Reflect::Bool(attr)) => {
                if value.is_truthy() {
                    el.attrs.insert(attr.to_string(), String::new());
                } else {
                    el.attrs.remove(attr);
                }
            }
            None => {}
        }
        el.props.insert(key, value);
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.remove(name);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(NodeData {
            kind: NodeKind::Text(t),
            ..
        }) = self.nodes.get_mut(node.0)
        {
            *t = text.to_string();
        }
    }

    fn add_listener(&mut self, node: NodeId, event: &str, listener: Listener) {
        if let Some(el) = self.element_mut(node) {
            el.listeners.push((event.to_string(), listener));
        }
    }

    fn flush_nested(&mut self, node: NodeId) -> Result<usize, EvalError> {
        let Some(el) = self.custom_element(node) else {
            return Ok(0);
        };
        let mut el = el.try_borrow_mut().map_err(|_| EvalError::Busy)?;
        el.flush(self)
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }
}
