use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::ast::TemplateNode;
use crate::compile::{CompileOptions, compile_with};
use crate::error::{CompileError, TemplateError};
use crate::parse::parse_template;
use crate::template::CompiledTemplate;

/// Every [`CompileOptions`] field that changes the compiled output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OptionsKey {
    name: String,
    root_name: String,
    create_root: bool,
    // Compared by address.
    nested_component: usize,
    methods: Option<BTreeSet<String>>,
}

impl From<&CompileOptions> for OptionsKey {
    fn from(options: &CompileOptions) -> Self {
        Self {
            name: options.name.clone(),
            root_name: options.root_name.clone(),
            create_root: options.create_root,
            nested_component: options.nested_component as usize,
            methods: options.methods.clone(),
        }
    }
}

/// Compiled templates keyed by AST identity or by source text, together with
/// the options they were compiled under.
#[derive(Default)]
pub struct TemplateCache {
    // The AST is kept alive so its address cannot be reused by another tree.
    by_ast: HashMap<(*const TemplateNode, OptionsKey), (Rc<TemplateNode>, Rc<CompiledTemplate>)>,
    by_source: HashMap<(String, OptionsKey), Rc<CompiledTemplate>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &mut self,
        ast: &Rc<TemplateNode>,
        options: &CompileOptions,
    ) -> Result<Rc<CompiledTemplate>, CompileError> {
        let key = (Rc::as_ptr(ast), OptionsKey::from(options));
        if let Some((_, compiled)) = self.by_ast.get(&key) {
            log::trace!("template cache hit for '{}'", compiled.name());
            return Ok(compiled.clone());
        }
        let compiled = Rc::new(compile_with(ast, options)?);
        self.by_ast.insert(key, (ast.clone(), compiled.clone()));
        Ok(compiled)
    }

    pub fn get_or_compile_source(
        &mut self,
        src: &str,
        options: &CompileOptions,
    ) -> Result<Rc<CompiledTemplate>, TemplateError> {
        let key = (src.to_string(), OptionsKey::from(options));
        if let Some(compiled) = self.by_source.get(&key) {
            log::trace!("template cache hit for '{}'", compiled.name());
            return Ok(compiled.clone());
        }
        let ast = parse_template(src)?;
        let compiled = Rc::new(compile_with(&ast, options)?);
        self.by_source.insert(key, compiled.clone());
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.by_ast.len() + self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
