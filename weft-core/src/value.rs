use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::component::{Component, ComponentRef};
use crate::error::EvalError;

/// Dynamic value carried by component properties, node properties and text.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Callback(Callback),
}

impl Value {
    /// JS-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Callback(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Callback(_) => "callback",
        }
    }

    /// Best-effort literal parsing used by command-line and test inputs:
    /// `true`/`false`/`null`, numbers, anything else is a string.
    pub fn parse_literal(raw: &str) -> Value {
        match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => match raw.parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Str(raw.to_string()),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => a == b,
            _ => false,
        }
    }
}

/// Text rendering of a value, as written into text nodes and attributes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Callback(_) => f.write_str("[callback]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Callback(cb) => write!(f, "Callback(bound: {})", cb.is_bound()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Callback> for Value {
    fn from(cb: Callback) -> Self {
        Value::Callback(cb)
    }
}

type CallbackFn = dyn Fn(&mut Component, &[Value]) -> Result<Value, EvalError>;

/// A function-typed value. Unbound until a template writes it onto a node, at
/// which point it is bound to the component owning that template.
#[derive(Clone)]
pub struct Callback {
    func: Rc<CallbackFn>,
    owner: Option<Weak<RefCell<Component>>>,
}

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Component, &[Value]) -> Result<Value, EvalError> + 'static,
    {
        Self {
            func: Rc::new(f),
            owner: None,
        }
    }

    /// Same function, bound to `owner`.
    pub fn bind(&self, owner: &ComponentRef) -> Self {
        Self {
            func: self.func.clone(),
            owner: Some(Rc::downgrade(owner)),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    /// Invoke against the bound owner.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        let owner = self
            .owner
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(EvalError::Detached)?;
        let mut component = owner.try_borrow_mut().map_err(|_| EvalError::Busy)?;
        (self.func)(&mut component, args)
    }

    /// Invoke against an explicit component, ignoring any binding.
    pub fn call_with(&self, component: &mut Component, args: &[Value]) -> Result<Value, EvalError> {
        (self.func)(component, args)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        let same_owner = match (&self.owner, &other.owner) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        Rc::ptr_eq(&self.func, &other.func) && same_owner
    }
}
