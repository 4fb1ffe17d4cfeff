//! Dependency-gated refresh steps.

use weft_core::Changes;

use crate::ops::Op;

/// An op that re-runs on refresh, either when one of its dependencies
/// changed or, for unconditional steps, on every refresh.
#[derive(Clone, Debug)]
pub struct RefreshStep {
    deps: Vec<String>,
    op: Op,
    always: bool,
}

impl RefreshStep {
    /// A step that runs on every refresh regardless of what changed.
    pub fn always(op: Op) -> Self {
        Self {
            deps: Vec::new(),
            op,
            always: true,
        }
    }

    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub fn is_unconditional(&self) -> bool {
        self.always
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    /// True iff `changed` names at least one dependency. Names that no step
    /// depends on simply never match.
    pub fn is_triggered_by(&self, changed: &Changes) -> bool {
        self.always || self.deps.iter().any(|d| changed.contains(d))
    }
}

/// Wrap `op` into a refresh step gated on `deps`.
///
/// No dependencies means the value is fixed after build: no step at all.
pub fn gate(deps: &[String], op: Op) -> Option<RefreshStep> {
    if deps.is_empty() {
        return None;
    }
    let mut unique: Vec<String> = Vec::with_capacity(deps.len());
    for d in deps {
        if !unique.contains(d) {
            unique.push(d.clone());
        }
    }
    Some(RefreshStep {
        deps: unique,
        op,
        always: false,
    })
}
