//! Registry of custom element kinds.
//!
//! A defined tag is instantiated (and connected) whenever a [`Document`]
//! creates an element of that tag. Writes of the properties it declares, and
//! nested flushes, are forwarded to its instance; anything else lands on the
//! element node like on any other element.
//!
//! [`Document`]: crate::Document

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use weft_core::{EvalError, NodeId, Value};

use crate::host::Host;
use crate::schema::PropertyPath;

pub trait CustomElement {
    /// Called once, right after the host element is created.
    fn connect(&mut self, host: &mut dyn Host, node: NodeId) -> Result<(), EvalError>;

    fn set_property(&mut self, path: &PropertyPath, value: Value);

    fn property(&self, name: &str) -> Option<Value>;

    /// Process pending property changes synchronously.
    fn flush(&mut self, host: &mut dyn Host) -> Result<usize, EvalError>;
}

pub type ElementFactory = Rc<dyn Fn() -> Box<dyn CustomElement>>;

struct Definition {
    properties: Vec<String>,
    factory: ElementFactory,
}

thread_local! {
    static DEFINITIONS: RefCell<HashMap<String, Rc<Definition>>> = RefCell::new(HashMap::new());
}

/// Register `tag`. The first definition of a tag wins; returns `false` if the
/// tag was already defined.
pub fn define_element(tag: &str, properties: Vec<String>, factory: ElementFactory) -> bool {
    DEFINITIONS.with(|defs| {
        let mut defs = defs.borrow_mut();
        if defs.contains_key(tag) {
            log::warn!("custom element <{tag}> is already defined");
            return false;
        }
        log::debug!("defined <{tag}> with properties {properties:?}");
        defs.insert(tag.to_string(), Rc::new(Definition { properties, factory }));
        true
    })
}

pub fn is_defined(tag: &str) -> bool {
    DEFINITIONS.with(|defs| defs.borrow().contains_key(tag))
}

pub fn defined_properties(tag: &str) -> Option<Vec<String>> {
    DEFINITIONS.with(|defs| defs.borrow().get(tag).map(|d| d.properties.clone()))
}

pub(crate) fn instantiate(tag: &str) -> Option<Box<dyn CustomElement>> {
    // Release the registry borrow before running the factory: it may define
    // or look up other tags.
    let def = DEFINITIONS.with(|defs| defs.borrow().get(tag).cloned())?;
    Some((def.factory)())
}
