use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use weft_core::{Changes, Component, Value};
use weft_dom::{Document, Host, Namespace};
use weft_template::{compile_with, parse_template, CompileOptions, CompiledTemplate, TemplateNode};

/// `name=value` pair from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub raw: String,
}

impl Assignment {
    /// The value as a literal: `true`, `false`, `null`, a number, or else a
    /// string.
    pub fn value(&self) -> Value {
        Value::parse_literal(&self.raw)
    }
}

pub fn parse_assignment(raw: &str) -> Result<Assignment> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("empty property name in '{raw}'"));
    }
    Ok(Assignment {
        name: name.to_string(),
        raw: value.to_string(),
    })
}

fn load(input: &Path, adopt_root: bool, name: Option<&str>) -> Result<(TemplateNode, CompiledTemplate)> {
    let src =
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let ast = parse_template(&src).with_context(|| format!("failed to parse {}", input.display()))?;

    let name = name
        .map(str::to_string)
        .or_else(|| input.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "template".to_string());
    let mut options = CompileOptions::named(name);
    options.create_root = !adopt_root;

    let compiled =
        compile_with(&ast, &options).with_context(|| format!("failed to compile {}", input.display()))?;
    Ok((ast, compiled))
}

/// Compile a template file and return its op listing.
pub fn compile_cmd(input: &Path, adopt_root: bool, name: Option<&str>) -> Result<String> {
    let (_, compiled) = load(input, adopt_root, name)?;
    Ok(compiled.to_string())
}

/// Build a template file against a component holding `props`, then apply
/// `updates` and refresh. Returns the markup after build and after the update.
pub fn render_cmd(
    input: &Path,
    props: &[Assignment],
    updates: &[Assignment],
    adopt_root: bool,
) -> Result<String> {
    let (ast, compiled) = load(input, adopt_root, None)?;
    let template = Rc::new(compiled);

    let mut component = Component::new(template.name());
    for p in props {
        component = component.with_prop(p.name.as_str(), p.value());
    }
    let component = component.into_ref();

    let mut doc = Document::new();
    let root = if adopt_root {
        let namespace = ast
            .namespace
            .as_deref()
            .and_then(Namespace::resolve)
            .unwrap_or_default();
        Some(doc.create_element(&ast.tag, namespace))
    } else {
        None
    };
    let mut instance = template
        .build(&mut doc, &component, root)
        .with_context(|| format!("failed to build {}", template.name()))?;

    let mut out = doc.to_markup(instance.root());
    out.push('\n');
    if updates.is_empty() {
        return Ok(out);
    }

    {
        let mut component = component
            .try_borrow_mut()
            .map_err(|_| anyhow!("component is busy"))?;
        for u in updates {
            component.set(u.name.as_str(), u.value());
        }
    }
    let changed: Changes = updates.iter().map(|u| u.name.clone()).collect();
    let report = instance.deliver(&mut doc);
    log::info!(
        "update {:?}: {} steps, {} failed",
        changed,
        report.executed,
        report.failed
    );

    out.push_str(&format!(
        "-- {} steps, {} failed\n",
        report.executed, report.failed
    ));
    out.push_str(&doc.to_markup(instance.root()));
    out.push('\n');
    Ok(out)
}
