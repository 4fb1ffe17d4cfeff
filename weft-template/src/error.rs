use thiserror::Error;

/// Template source could not be turned into a [`TemplateNode`].
///
/// [`TemplateNode`]: crate::ast::TemplateNode
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("closing tag </{close}> does not match <{open}>")]
    MismatchedClose { open: String, close: String },

    #[error("a template needs exactly one root element, found {0}")]
    RootCount(usize),

    #[error("invalid expression '{source_text}': {message}")]
    Expression {
        source_text: String,
        message: String,
    },
}

/// Malformed AST. Raised by `compile`, never during build or refresh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("node at {path} has neither a tag nor an expression")]
    MissingTagOrExpression { path: String },

    #[error("text node at {path} carries attributes, events, attach points or children")]
    TextWithElementParts { path: String },

    #[error("the template root must be an element, not text")]
    TextRoot,

    #[error("unknown namespace '{namespace}' on <{tag}>")]
    UnknownNamespace { tag: String, namespace: String },

    #[error("attach point '{name}' is declared on more than one node")]
    DuplicateAttachPoint { name: String },

    #[error("handler for '{event}' on <{tag}> names unknown method '{method}'")]
    UnknownHandler {
        tag: String,
        event: String,
        method: String,
    },
}

/// Failure to acquire the root of a new instance. Fatal to that instance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("template '{0}' adopts an existing root but none was supplied")]
    MissingRoot(String),

    #[error("template '{0}' creates its own root; an existing root was supplied")]
    UnexpectedRoot(String),

    #[error("root node {node} does not belong to the host")]
    UnknownRoot { node: weft_core::NodeId },

    #[error("owning component is borrowed elsewhere")]
    ComponentBusy,
}

/// Any failure on the way from source text to a compiled template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
