//! Node and tree compiler: template AST to build ops plus gated refresh steps.

use std::collections::{BTreeSet, HashMap};

use weft_dom::Namespace;

use crate::ast::{Child, HandlerSpec, TemplateNode, TextSpec};
use crate::error::CompileError;
use crate::gate::{RefreshStep, gate};
use crate::ops::{Op, Slot};
use crate::resolve::resolve;
use crate::template::CompiledTemplate;

/// Tags following the nested-component convention: a hyphen in the name.
pub fn is_hyphenated(tag: &str) -> bool {
    tag.contains('-')
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Label used in listings and diagnostics.
    pub name: String,
    /// Slot name of the template root.
    pub root_name: String,
    /// Create the root element, or adopt one supplied at build time.
    pub create_root: bool,
    /// Which tags are nested reactive components that need flushing.
    pub nested_component: fn(&str) -> bool,
    /// When set, method handlers must name one of these.
    pub methods: Option<BTreeSet<String>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            name: "template".to_string(),
            root_name: "root".to_string(),
            create_root: true,
            nested_component: is_hyphenated,
            methods: None,
        }
    }
}

impl CompileOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn adopt_root(mut self) -> Self {
        self.create_root = false;
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}

/// Build ops and refresh steps of one subtree, in emission order.
#[derive(Debug, Default)]
pub struct Steps {
    pub build: Vec<Op>,
    pub refresh: Vec<RefreshStep>,
}

impl Steps {
    fn emit(&mut self, deps: &[String], op: Op) {
        if let Some(step) = gate(deps, op.clone()) {
            self.refresh.push(step);
        }
        self.build.push(op);
    }

    fn extend(&mut self, other: Steps) {
        self.build.extend(other.build);
        self.refresh.extend(other.refresh);
    }
}

/// Compile `ast` with default options apart from the root.
pub fn compile(
    ast: &TemplateNode,
    root_name: &str,
    create_root: bool,
) -> Result<CompiledTemplate, CompileError> {
    let options = CompileOptions {
        root_name: root_name.to_string(),
        create_root,
        ..Default::default()
    };
    compile_with(ast, &options)
}

pub fn compile_with(
    ast: &TemplateNode,
    options: &CompileOptions,
) -> Result<CompiledTemplate, CompileError> {
    if ast.is_text() {
        return Err(match ast.expression {
            Some(_) => CompileError::TextRoot,
            None => CompileError::MissingTagOrExpression {
                path: options.root_name.clone(),
            },
        });
    }

    let mut compiler = NodeCompiler {
        options,
        slot_names: Vec::new(),
        attach_owners: HashMap::new(),
    };
    let root = compiler.alloc(options.root_name.clone());
    let steps = compiler.compile_node(
        root,
        options.create_root,
        ast,
        Namespace::Html,
        &options.root_name,
    )?;

    log::debug!(
        "compiled '{}': {} slots, {} build ops, {} refresh steps",
        options.name,
        compiler.slot_names.len(),
        steps.build.len(),
        steps.refresh.len()
    );
    Ok(CompiledTemplate::new(
        options.name.clone(),
        compiler.slot_names,
        steps,
        options.create_root,
    ))
}

fn has_element_parts(node: &TemplateNode) -> bool {
    node.namespace.is_some()
        || !node.attach_points.is_empty()
        || !node.attributes.is_empty()
        || !node.events.is_empty()
        || !node.children.is_empty()
}

struct NodeCompiler<'a> {
    options: &'a CompileOptions,
    slot_names: Vec<String>,
    attach_owners: HashMap<String, Slot>,
}

impl NodeCompiler<'_> {
    fn alloc(&mut self, name: String) -> Slot {
        self.slot_names.push(name);
        self.slot_names.len() - 1
    }

    fn fresh(&mut self) -> Slot {
        let name = format!("n{}", self.slot_names.len());
        self.alloc(name)
    }

    fn compile_node(
        &mut self,
        slot: Slot,
        should_create: bool,
        node: &TemplateNode,
        inherited: Namespace,
        path: &str,
    ) -> Result<Steps, CompileError> {
        let namespace = match &node.namespace {
            Some(raw) => Namespace::resolve(raw).ok_or_else(|| CompileError::UnknownNamespace {
                tag: node.tag.clone(),
                namespace: raw.clone(),
            })?,
            None => inherited,
        };
        let mut steps = Steps::default();

        if should_create {
            steps.build.push(Op::CreateElement {
                slot,
                tag: node.tag.clone(),
                namespace,
            });
        } else {
            steps.build.push(Op::AdoptRoot { slot });
        }

        for name in &node.attach_points {
            match self.attach_owners.get(name) {
                Some(owner) if *owner == slot => continue,
                Some(_) => {
                    return Err(CompileError::DuplicateAttachPoint { name: name.clone() });
                }
                None => {
                    self.attach_owners.insert(name.clone(), slot);
                }
            }
            steps.build.push(Op::Attach {
                slot,
                name: name.clone(),
            });
        }

        for attr in &node.attributes {
            let value = attr.spec.value.clone();
            let op = match resolve(&node.tag, namespace, &attr.name) {
                Some(path) => Op::SetProperty { slot, path, value },
                None => Op::SetAttribute {
                    slot,
                    name: attr.name.clone(),
                    value,
                },
            };
            steps.emit(&attr.spec.deps, op);
        }

        if should_create && (self.options.nested_component)(&node.tag) {
            let op = Op::FlushNested { slot };
            steps.refresh.push(RefreshStep::always(op.clone()));
            steps.build.push(op);
        }

        for binding in &node.events {
            if let (HandlerSpec::Method(method), Some(known)) =
                (&binding.handler, &self.options.methods)
            {
                if !known.contains(method) {
                    return Err(CompileError::UnknownHandler {
                        tag: node.tag.clone(),
                        event: binding.event.clone(),
                        method: method.clone(),
                    });
                }
            }
            steps.build.push(Op::Connect {
                slot,
                event: binding.event.clone(),
                handler: binding.handler.clone(),
            });
        }

        for (i, child) in node.children.iter().enumerate() {
            let child_path = format!("{path}/{i}");
            let child_slot = match child {
                Child::Text(spec) => self.compile_text(spec, &mut steps),
                Child::Element(el) if el.is_text() => match &el.expression {
                    Some(_) if has_element_parts(el) => {
                        return Err(CompileError::TextWithElementParts { path: child_path });
                    }
                    Some(spec) => self.compile_text(spec, &mut steps),
                    None => {
                        return Err(CompileError::MissingTagOrExpression { path: child_path });
                    }
                },
                Child::Element(el) => {
                    let child_slot = self.fresh();
                    let sub = self.compile_node(child_slot, true, el, namespace, &child_path)?;
                    steps.extend(sub);
                    child_slot
                }
            };
            steps.build.push(Op::AppendChild {
                parent: slot,
                child: child_slot,
            });
        }

        Ok(steps)
    }

    fn compile_text(&mut self, spec: &TextSpec, steps: &mut Steps) -> Slot {
        let slot = self.fresh();
        steps.build.push(Op::CreateText {
            slot,
            value: spec.value.clone(),
        });
        if let Some(step) = gate(
            &spec.deps,
            Op::SetText {
                slot,
                value: spec.value.clone(),
            },
        ) {
            steps.refresh.push(step);
        }
        slot
    }
}
