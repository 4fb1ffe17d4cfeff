//! Shared vocabulary of the weft toolkit: dynamic values, components and the
//! node handles templates hand out.

pub mod component;
pub mod error;
pub mod value;

pub use component::{Changes, Component, ComponentRef, Event, Method, changes};
pub use error::EvalError;
pub use value::{Callback, Value};

/// Non-owning handle to a node living in a host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
