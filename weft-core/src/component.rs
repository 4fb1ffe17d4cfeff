use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::NodeId;
use crate::error::EvalError;
use crate::value::Value;

/// Set of property names changed since the last refresh.
pub type Changes = BTreeSet<String>;

/// Build a [`Changes`] set from any list of names.
pub fn changes<I, S>(names: I) -> Changes
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Shared handle to a component. Templates, listeners and callbacks only keep
/// `Weak` references to it.
pub type ComponentRef = Rc<RefCell<Component>>;

/// A component method callable from event handlers.
pub type Method = Rc<dyn Fn(&mut Component, &Event) -> Result<(), EvalError>>;

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: String,
    pub target: NodeId,
    pub detail: Value,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: NodeId, detail: Value) -> Self {
        Self {
            kind: kind.into(),
            target,
            detail,
        }
    }
}

/// The owning component of a template instance: named properties, named
/// methods, the attach points its template exposed, and the names of the
/// properties changed since they were last delivered.
#[derive(Default)]
pub struct Component {
    name: String,
    props: BTreeMap<String, Value>,
    methods: HashMap<String, Method>,
    attach_points: HashMap<String, NodeId>,
    pending: Changes,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style property initialisation. Does not record a change.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Component, &Event) -> Result<(), EvalError> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(f));
        self
    }

    pub fn into_ref(self) -> ComponentRef {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Missing properties read as `Null`.
    pub fn get(&self, name: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.props.get(name).unwrap_or(NULL)
    }

    pub fn has(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    pub fn prop_names(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Set a property, recording a pending change if the value differs.
    /// Returns whether a change was recorded.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        let value = value.into();
        if self.props.get(&name) == Some(&value) {
            return false;
        }
        log::trace!("{}: {} changed", self.name, name);
        self.props.insert(name.clone(), value);
        self.pending.insert(name);
        true
    }

    /// Record a change without touching the value.
    pub fn notify(&mut self, name: impl Into<String>) {
        self.pending.insert(name.into());
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &Changes {
        &self.pending
    }

    /// Drain the pending change set.
    pub fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.pending)
    }

    pub fn add_method<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Component, &Event) -> Result<(), EvalError> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(f));
    }

    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Call a method by name with the given event.
    pub fn invoke(&mut self, name: &str, event: &Event) -> Result<(), EvalError> {
        let method = self
            .method(name)
            .ok_or_else(|| EvalError::UnknownMethod(name.to_string()))?;
        method(self, event)
    }

    /// Expose `node` under `name`. Only templates call this, once per build.
    pub fn attach(&mut self, name: impl Into<String>, node: NodeId) {
        self.attach_points.insert(name.into(), node);
    }

    pub fn attach_point(&self, name: &str) -> Option<NodeId> {
        self.attach_points.get(name).copied()
    }

    pub fn attach_points(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.attach_points.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("props", &self.props)
            .field("methods", &methods)
            .field("pending", &self.pending)
            .finish()
    }
}
