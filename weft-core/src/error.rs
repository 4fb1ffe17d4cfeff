use thiserror::Error;

/// Failure of a single value computation, callback or handler.
///
/// These never abort a build or a refresh: the runtime reports them and moves
/// on to the next step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("type error: {0}")]
    Type(String),

    #[error("component has no method named '{0}'")]
    UnknownMethod(String),

    #[error("owning component is no longer alive")]
    Detached,

    #[error("component is already borrowed by a running update")]
    Busy,

    #[error("{0}")]
    Failed(String),
}

impl EvalError {
    pub fn failed(msg: impl Into<String>) -> Self {
        EvalError::Failed(msg.into())
    }
}
