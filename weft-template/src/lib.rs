//! Template compiler for weft components.
//!
//! A [`TemplateNode`] tree (built by hand or parsed from markup) is compiled
//! once into a [`CompiledTemplate`]: a list of build ops plus refresh steps
//! gated on the component properties they read. Each component instance then
//! builds the template into a [`Host`](weft_dom::Host) and refreshes it with
//! the names of the properties that changed.

pub mod ast;
pub mod cache;
pub mod compile;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod gate;
pub mod ops;
pub mod parse;
pub mod resolve;
pub mod template;
pub mod widget;

pub use ast::{
    Attribute, AttributeSpec, Child, Computation, EventBinding, HandlerSpec, InlineHandler,
    TemplateNode, TextSpec, ValueSpec,
};
pub use cache::TemplateCache;
pub use compile::{CompileOptions, compile, compile_with};
pub use diagnostics::{CollectSink, Diagnostic, DiagnosticSink, LogSink, Phase};
pub use error::{BuildError, CompileError, ParseError, TemplateError};
pub use gate::{RefreshStep, gate};
pub use ops::{Op, Slot};
pub use parse::parse_template;
pub use resolve::resolve;
pub use template::{CompiledTemplate, Instance, RefreshReport};
pub use widget::{ComponentWidget, define_component};

/// Parse and compile template markup in one go.
pub fn compile_source(
    src: &str,
    options: &CompileOptions,
) -> Result<CompiledTemplate, TemplateError> {
    let ast = parse_template(src)?;
    Ok(compile_with(&ast, options)?)
}
