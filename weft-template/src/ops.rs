//! Instruction set of compiled templates.

use std::fmt;

use weft_dom::{Namespace, PropertyPath};

use crate::ast::{Computation, HandlerSpec};

/// Index of a node within one template instance.
pub type Slot = usize;

#[derive(Clone, Debug)]
pub enum Op {
    /// Create an element and bind it to `slot`.
    CreateElement {
        slot: Slot,
        tag: String,
        namespace: Namespace,
    },
    /// Bind the caller-supplied root node to `slot`.
    AdoptRoot { slot: Slot },
    /// Expose the node on the owning component under `name`.
    Attach { slot: Slot, name: String },
    SetProperty {
        slot: Slot,
        path: PropertyPath,
        value: Computation,
    },
    /// Set the attribute, or remove it when the value is falsy.
    SetAttribute {
        slot: Slot,
        name: String,
        value: Computation,
    },
    /// Make a nested component process its pending changes.
    FlushNested { slot: Slot },
    Connect {
        slot: Slot,
        event: String,
        handler: HandlerSpec,
    },
    CreateText { slot: Slot, value: Computation },
    SetText { slot: Slot, value: Computation },
    AppendChild { parent: Slot, child: Slot },
}

impl Op {
    /// The slot this op writes to.
    pub fn slot(&self) -> Slot {
        match self {
            Op::CreateElement { slot, .. }
            | Op::AdoptRoot { slot }
            | Op::Attach { slot, .. }
            | Op::SetProperty { slot, .. }
            | Op::SetAttribute { slot, .. }
            | Op::FlushNested { slot }
            | Op::Connect { slot, .. }
            | Op::CreateText { slot, .. }
            | Op::SetText { slot, .. } => *slot,
            Op::AppendChild { parent, .. } => *parent,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::CreateElement { .. } => "create",
            Op::AdoptRoot { .. } => "adopt",
            Op::Attach { .. } => "attach",
            Op::SetProperty { .. } => "prop",
            Op::SetAttribute { .. } => "attr",
            Op::FlushNested { .. } => "flush",
            Op::Connect { .. } => "on",
            Op::CreateText { .. } => "text",
            Op::SetText { .. } => "set-text",
            Op::AppendChild { .. } => "append",
        }
    }

    /// Render with slot names in place of indices.
    pub fn describe(&self, names: &[String]) -> String {
        let n = |s: &Slot| names.get(*s).cloned().unwrap_or_else(|| format!("n{s}"));
        match self {
            Op::CreateElement {
                slot,
                tag,
                namespace,
            } => {
                if namespace.is_html() {
                    format!("{} = create <{tag}>", n(slot))
                } else {
                    format!("{} = create <{namespace}:{tag}>", n(slot))
                }
            }
            Op::AdoptRoot { slot } => format!("{} = adopt root", n(slot)),
            Op::Attach { slot, name } => format!("attach {} as '{name}'", n(slot)),
            Op::SetProperty { slot, path, value } => {
                format!("{}.{path} = {value:?}", n(slot))
            }
            Op::SetAttribute { slot, name, value } => {
                format!("{}[{name}] = {value:?}", n(slot))
            }
            Op::FlushNested { slot } => format!("flush {}", n(slot)),
            Op::Connect {
                slot,
                event,
                handler,
            } => format!("on {} '{event}' -> {handler:?}", n(slot)),
            Op::CreateText { slot, value } => format!("{} = text {value:?}", n(slot)),
            Op::SetText { slot, value } => format!("{}.text = {value:?}", n(slot)),
            Op::AppendChild { parent, child } => format!("append {} to {}", n(child), n(parent)),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(&[]))
    }
}
