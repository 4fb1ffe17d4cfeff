use std::rc::Rc;

use weft_core::{EvalError, Event, NodeId, Value};

use crate::schema::{Namespace, PropertyPath};

/// Event callback registered on a node.
pub type Listener = Rc<dyn Fn(&Event) -> Result<(), EvalError>>;

/// Node-creation and node-mutation primitives a template runs against.
///
/// Nodes are owned by the host; templates only hold [`NodeId`] handles.
pub trait Host {
    fn create_element(&mut self, tag: &str, namespace: Namespace) -> NodeId;

    fn create_text(&mut self, text: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    fn set_property(&mut self, node: NodeId, path: &PropertyPath, value: Value);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn set_text(&mut self, node: NodeId, text: &str);

    fn add_listener(&mut self, node: NodeId, event: &str, listener: Listener);

    /// Make a nested reactive component process its pending changes now.
    /// Returns the number of update steps it ran; plain nodes run none.
    fn flush_nested(&mut self, node: NodeId) -> Result<usize, EvalError>;

    fn contains(&self, node: NodeId) -> bool;
}
