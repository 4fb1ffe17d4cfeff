//! Components usable as custom elements inside other templates.

use std::rc::Rc;

use weft_core::{Component, ComponentRef, EvalError, NodeId, Value};
use weft_dom::{CustomElement, ElementFactory, Host, PropertyPath, define_element};

use crate::error::BuildError;
use crate::template::{CompiledTemplate, Instance};

/// Custom element backed by a component and an adopted-root template.
pub struct ComponentWidget {
    template: Rc<CompiledTemplate>,
    component: ComponentRef,
    instance: Option<Instance>,
}

impl ComponentWidget {
    pub fn new(template: Rc<CompiledTemplate>, component: Component) -> Self {
        Self {
            template,
            component: component.into_ref(),
            instance: None,
        }
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    pub fn is_connected(&self) -> bool {
        self.instance.is_some()
    }
}

impl CustomElement for ComponentWidget {
    fn connect(&mut self, host: &mut dyn Host, node: NodeId) -> Result<(), EvalError> {
        let instance = self
            .template
            .build(host, &self.component, Some(node))
            .map_err(|e| EvalError::failed(e.to_string()))?;
        self.instance = Some(instance);
        Ok(())
    }

    fn set_property(&mut self, path: &PropertyPath, value: Value) {
        match self.component.try_borrow_mut() {
            Ok(mut component) => {
                component.set(path.to_string(), value);
            }
            Err(_) => log::warn!("{}: busy, property {path} dropped", self.template.name()),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        let component = self.component.try_borrow().ok()?;
        component.has(name).then(|| component.get(name).clone())
    }

    fn flush(&mut self, host: &mut dyn Host) -> Result<usize, EvalError> {
        let Some(instance) = self.instance.as_mut() else {
            return Ok(0);
        };
        let report = instance.deliver(host);
        Ok(report.executed)
    }
}

/// Register `tag` as a nested component rendered by `template`.
///
/// `template` must adopt its root: the custom element's own node. `init`
/// creates the component of each new element; the properties of one such
/// component become the tag's declared property list. Returns `Ok(false)` if
/// the tag was already defined.
pub fn define_component<F>(
    tag: &str,
    template: Rc<CompiledTemplate>,
    init: F,
) -> Result<bool, BuildError>
where
    F: Fn() -> Component + 'static,
{
    if template.creates_root() {
        return Err(BuildError::UnexpectedRoot(template.name().to_string()));
    }
    let properties: Vec<String> = init().prop_names().map(str::to_string).collect();
    let factory: ElementFactory = Rc::new(move || -> Box<dyn CustomElement> {
        Box::new(ComponentWidget::new(template.clone(), init()))
    });
    Ok(define_element(tag, properties, factory))
}
