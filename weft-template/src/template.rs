// weft-template/src/template.rs

use std::fmt;
use std::rc::Rc;

use weft_core::{Changes, ComponentRef, EvalError, Event, NodeId, Value};
use weft_dom::{Host, Listener, PropertyPath};

use crate::ast::{Computation, HandlerSpec};
use crate::compile::Steps;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, Phase};
use crate::error::BuildError;
use crate::gate::RefreshStep;
use crate::ops::{Op, Slot};

/// Upper bound on refresh rounds in one [`Instance::deliver`] call.
const MAX_DELIVERY_ROUNDS: usize = 32;

/// Output of the compiler. Immutable; shared by every instance built from it.
#[derive(Debug)]
pub struct CompiledTemplate {
    name: String,
    slot_names: Vec<String>,
    build: Vec<Op>,
    refresh: Vec<RefreshStep>,
    create_root: bool,
}

impl CompiledTemplate {
    pub(crate) fn new(name: String, slot_names: Vec<String>, steps: Steps, create_root: bool) -> Self {
        Self {
            name,
            slot_names,
            build: steps.build,
            refresh: steps.refresh,
            create_root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_count(&self) -> usize {
        self.slot_names.len()
    }

    pub fn slot_name(&self, slot: Slot) -> &str {
        self.slot_names.get(slot).map(String::as_str).unwrap_or("?")
    }

    pub fn build_ops(&self) -> &[Op] {
        &self.build
    }

    pub fn refresh_steps(&self) -> &[RefreshStep] {
        &self.refresh
    }

    pub fn creates_root(&self) -> bool {
        self.create_root
    }

    /// Build a new instance, reporting evaluation failures to [`LogSink`].
    ///
    /// `root` must be `Some` exactly when the template adopts its root.
    pub fn build(
        self: &Rc<Self>,
        host: &mut dyn Host,
        component: &ComponentRef,
        root: Option<NodeId>,
    ) -> Result<Instance, BuildError> {
        self.build_with_sink(host, component, root, Rc::new(LogSink))
    }

    pub fn build_with_sink(
        self: &Rc<Self>,
        host: &mut dyn Host,
        component: &ComponentRef,
        root: Option<NodeId>,
        sink: Rc<dyn DiagnosticSink>,
    ) -> Result<Instance, BuildError> {
        match (self.create_root, root) {
            (true, Some(_)) => return Err(BuildError::UnexpectedRoot(self.name.clone())),
            (false, None) => return Err(BuildError::MissingRoot(self.name.clone())),
            (false, Some(node)) if !host.contains(node) => {
                return Err(BuildError::UnknownRoot { node });
            }
            _ => {}
        }
        if component.try_borrow_mut().is_err() {
            return Err(BuildError::ComponentBusy);
        }

        let mut instance = Instance {
            template: self.clone(),
            component: component.clone(),
            slots: vec![None; self.slot_names.len()],
            root: NodeId(0),
            sink,
        };
        for op in &self.build {
            let outcome = match op {
                Op::AdoptRoot { slot } => {
                    instance.bind(*slot, root);
                    Ok(())
                }
                op => instance.exec(host, op),
            };
            if let Err(error) = outcome {
                instance.report(op, Phase::Build, error);
            }
        }
        instance.root = instance
            .slots
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| BuildError::MissingRoot(self.name.clone()))?;

        log::debug!("built '{}' at {}", self.name, instance.root);
        Ok(instance)
    }
}

impl fmt::Display for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "template {}", self.name)?;
        writeln!(f, "build:")?;
        for op in &self.build {
            writeln!(f, "  {}", op.describe(&self.slot_names))?;
        }
        writeln!(f, "refresh:")?;
        for step in &self.refresh {
            let gate = if step.is_unconditional() {
                "*".to_string()
            } else {
                step.deps().join(", ")
            };
            writeln!(f, "  [{gate}] {}", step.op().describe(&self.slot_names))?;
        }
        Ok(())
    }
}

/// Outcome of one refresh: gated steps that ran, and how many of them failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub executed: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for RefreshReport {
    fn add_assign(&mut self, other: Self) {
        self.executed += other.executed;
        self.failed += other.failed;
    }
}

/// A built template: its nodes plus the component they render.
pub struct Instance {
    template: Rc<CompiledTemplate>,
    component: ComponentRef,
    slots: Vec<Option<NodeId>>,
    root: NodeId,
    sink: Rc<dyn DiagnosticSink>,
}

impl Instance {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn template(&self) -> &Rc<CompiledTemplate> {
        &self.template
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    /// Node bound to `slot`, if built.
    pub fn node(&self, slot: Slot) -> Option<NodeId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Run every refresh step whose dependencies intersect `changed`, plus the
    /// unconditional ones, in emission order. A failing step is reported and
    /// skipped.
    pub fn refresh(&mut self, host: &mut dyn Host, changed: &Changes) -> RefreshReport {
        let template = self.template.clone();
        let mut report = RefreshReport::default();
        for step in template.refresh_steps() {
            if !step.is_triggered_by(changed) {
                continue;
            }
            log::trace!(
                "{}: {}",
                template.name,
                step.op().describe(&template.slot_names)
            );
            report.executed += 1;
            if let Err(error) = self.exec(host, step.op()) {
                report.failed += 1;
                self.report(step.op(), Phase::Refresh, error);
            }
        }
        report
    }

    /// Drain the component's pending changes and refresh until none remain.
    pub fn deliver(&mut self, host: &mut dyn Host) -> RefreshReport {
        let mut total = RefreshReport::default();
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let changed = match self.component.try_borrow_mut() {
                Ok(mut component) => component.take_changes(),
                Err(_) => {
                    log::warn!("{}: component busy, delivery postponed", self.template.name);
                    return total;
                }
            };
            if changed.is_empty() {
                return total;
            }
            total += self.refresh(host, &changed);
        }
        log::warn!(
            "{}: changes still pending after {MAX_DELIVERY_ROUNDS} rounds",
            self.template.name
        );
        total
    }

    fn bind(&mut self, slot: Slot, node: Option<NodeId>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = node;
        }
    }

    fn slot_node(&self, slot: Slot) -> Result<NodeId, EvalError> {
        self.node(slot).ok_or_else(|| {
            EvalError::failed(format!("{} was never built", self.template.slot_name(slot)))
        })
    }

    fn eval(&self, value: &Computation) -> Result<Value, EvalError> {
        let component = self.component.try_borrow().map_err(|_| EvalError::Busy)?;
        value.eval(&component)
    }

    fn bound(&self, value: Value) -> Value {
        match value {
            Value::Callback(cb) => Value::Callback(cb.bind(&self.component)),
            v => v,
        }
    }

    fn exec(&mut self, host: &mut dyn Host, op: &Op) -> Result<(), EvalError> {
        match op {
            Op::CreateElement {
                slot,
                tag,
                namespace,
            } => {
                let node = host.create_element(tag, *namespace);
                self.bind(*slot, Some(node));
            }
            Op::AdoptRoot { slot } => {
                self.slot_node(*slot)?;
            }
            Op::Attach { slot, name } => {
                let node = self.slot_node(*slot)?;
                let mut component = self
                    .component
                    .try_borrow_mut()
                    .map_err(|_| EvalError::Busy)?;
                component.attach(name.as_str(), node);
            }
            Op::SetProperty { slot, path, value } => {
                let node = self.slot_node(*slot)?;
                let value = self.bound(self.eval(value)?);
                host.set_property(node, path, value);
            }
            Op::SetAttribute { slot, name, value } => {
                let node = self.slot_node(*slot)?;
                match self.eval(value)? {
                    Value::Callback(cb) => {
                        let cb = Value::Callback(cb.bind(&self.component));
                        host.set_property(node, &PropertyPath::new(name.as_str()), cb);
                    }
                    Value::Bool(true) => host.set_attribute(node, name, ""),
                    v if v.is_truthy() => host.set_attribute(node, name, &v.to_string()),
                    _ => host.remove_attribute(node, name),
                }
            }
            Op::FlushNested { slot } => {
                let node = self.slot_node(*slot)?;
                let ran = host.flush_nested(node)?;
                log::trace!("flushed {node}: {ran} steps");
            }
            Op::Connect {
                slot,
                event,
                handler,
            } => {
                let node = self.slot_node(*slot)?;
                host.add_listener(node, event, self.listener(handler.clone()));
            }
            Op::CreateText { slot, value } => {
                let result = self.eval(value);
                let text = match &result {
                    Ok(v) => v.to_string(),
                    Err(_) => String::new(),
                };
                let node = host.create_text(&text);
                self.bind(*slot, Some(node));
                result?;
            }
            Op::SetText { slot, value } => {
                let node = self.slot_node(*slot)?;
                let text = self.eval(value)?.to_string();
                host.set_text(node, &text);
            }
            Op::AppendChild { parent, child } => {
                let parent = self.slot_node(*parent)?;
                let child = self.slot_node(*child)?;
                host.append_child(parent, child);
            }
        }
        Ok(())
    }

    fn listener(&self, handler: HandlerSpec) -> Listener {
        let owner = Rc::downgrade(&self.component);
        Rc::new(move |event: &Event| {
            let component = owner.upgrade().ok_or(EvalError::Detached)?;
            let mut component = component.try_borrow_mut().map_err(|_| EvalError::Busy)?;
            match &handler {
                HandlerSpec::Method(name) => component.invoke(name, event),
                HandlerSpec::Inline(inline) => inline.run(&mut component, event),
            }
        })
    }

    fn report(&self, op: &Op, phase: Phase, error: EvalError) {
        self.sink.report(Diagnostic {
            template: self.template.name.clone(),
            slot: self.template.slot_name(op.slot()).to_string(),
            op: op.name(),
            phase,
            error,
        });
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("template", &self.template.name)
            .field("root", &self.root)
            .field("slots", &self.slots)
            .finish()
    }
}
