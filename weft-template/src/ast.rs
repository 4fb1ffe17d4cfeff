//! Structural form of a template, as handed to the compiler.

use std::fmt;
use std::rc::Rc;

use weft_core::{Component, EvalError, Event, Value};

type ComputeFn = dyn Fn(&Component) -> Result<Value, EvalError>;
type HandlerFn = dyn Fn(&mut Component, &Event) -> Result<(), EvalError>;

/// A pure value computation over component state.
#[derive(Clone)]
pub struct Computation {
    label: Rc<str>,
    f: Rc<ComputeFn>,
}

impl Computation {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Component) -> Result<Value, EvalError> + 'static,
    {
        Self {
            label: label.into().into(),
            f: Rc::new(f),
        }
    }

    pub fn constant(value: Value) -> Self {
        let label = match &value {
            Value::Str(s) => format!("{s:?}"),
            Value::Callback(_) => "<callback>".to_string(),
            v => v.to_string(),
        };
        Self::new(label, move |_| Ok(value.clone()))
    }

    pub fn property(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::new(name.clone(), move |c| Ok(c.get(&name).clone()))
    }

    pub fn eval(&self, component: &Component) -> Result<Value, EvalError> {
        (self.f)(component)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A computation plus the property names whose change should re-run it.
#[derive(Clone, Debug)]
pub struct ValueSpec {
    pub value: Computation,
    pub deps: Vec<String>,
}

pub type AttributeSpec = ValueSpec;
pub type TextSpec = ValueSpec;

impl ValueSpec {
    pub fn new(value: Computation, deps: Vec<String>) -> Self {
        Self { value, deps }
    }

    /// Fixed value: no dependencies, never refreshed.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(Computation::constant(value.into()), Vec::new())
    }

    /// The value of one component property, refreshed when it changes.
    pub fn property(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::new(Computation::property(name.clone()), vec![name])
    }

    pub fn computed<F, I, S>(label: impl Into<String>, deps: I, f: F) -> Self
    where
        F: Fn(&Component) -> Result<Value, EvalError> + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Computation::new(label, f),
            deps.into_iter().map(Into::into).collect(),
        )
    }
}

/// Inline event handler running in the component's context.
#[derive(Clone)]
pub struct InlineHandler {
    label: Rc<str>,
    f: Rc<HandlerFn>,
}

impl InlineHandler {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Component, &Event) -> Result<(), EvalError> + 'static,
    {
        Self {
            label: label.into().into(),
            f: Rc::new(f),
        }
    }

    pub fn run(&self, component: &mut Component, event: &Event) -> Result<(), EvalError> {
        (self.f)(component, event)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Clone)]
pub enum HandlerSpec {
    /// Name of a method on the owning component.
    Method(String),
    Inline(InlineHandler),
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSpec::Method(name) => write!(f, "{name}"),
            HandlerSpec::Inline(h) => write!(f, "{{{}}}", h.label),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Attribute {
    pub name: String,
    pub spec: AttributeSpec,
}

#[derive(Clone, Debug)]
pub struct EventBinding {
    pub event: String,
    pub handler: HandlerSpec,
}

#[derive(Clone, Debug)]
pub enum Child {
    Element(TemplateNode),
    Text(TextSpec),
}

/// One node of a template. An empty `tag` denotes a text/expression node,
/// whose value is carried in `expression`.
#[derive(Clone, Debug, Default)]
pub struct TemplateNode {
    pub tag: String,
    pub namespace: Option<String>,
    pub attach_points: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub events: Vec<EventBinding>,
    pub children: Vec<Child>,
    pub expression: Option<TextSpec>,
}

impl TemplateNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn text_node(spec: TextSpec) -> Self {
        Self {
            expression: Some(spec),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    pub fn attach(mut self, name: impl Into<String>) -> Self {
        self.attach_points.push(name.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            spec,
        });
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: HandlerSpec) -> Self {
        self.events.push(EventBinding {
            event: event.into(),
            handler,
        });
        self
    }

    pub fn child(mut self, node: TemplateNode) -> Self {
        self.children.push(Child::Element(node));
        self
    }

    pub fn text(mut self, spec: TextSpec) -> Self {
        self.children.push(Child::Text(spec));
        self
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_empty()
    }
}
