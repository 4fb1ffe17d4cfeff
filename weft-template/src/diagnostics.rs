//! Reporting of isolated evaluation failures.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use weft_core::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Refresh,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Build => "build",
            Phase::Refresh => "refresh",
        })
    }
}

/// One failed step. The step's slot keeps its previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub template: String,
    /// Name of the slot the failing op targets.
    pub slot: String,
    /// Op kind, as in [`Op::name`](crate::ops::Op::name).
    pub op: &'static str,
    pub phase: Phase,
    pub error: EvalError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} failed during {}: {}",
            self.template, self.op, self.slot, self.phase, self.error
        )
    }
}

pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: a warning through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    seen: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.seen.borrow_mut().push(diagnostic);
    }
}
