use crate::interop::HostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("{form}: {reason}")]
    MalformedForm { form: String, reason: String },
    #[error("{prim}: {msg}")]
    TypeMismatch { prim: String, msg: String },
    #[error("{0}: unbound variable")]
    UnboundReference(String),
    #[error("{prim}: expected {expected} argument(s), got {got}")]
    ArityError { prim: String, expected: String, got: usize },
    #[error(transparent)]
    HostInterop(#[from] HostError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// Raised by the program itself through `error`.
    #[error("{0}")]
    Raised(String),
    #[error("output: {0}")]
    Output(#[from] std::io::Error),
}

/// Misuse of a pattern-variable capture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("cannot append to a single-value capture")]
    AppendToLeaf,
    #[error("capture of rank {found} cannot join a sequence of rank {expected}")]
    RankMismatch { expected: usize, found: usize },
    #[error("enumerator exhausted")]
    Exhausted,
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub fn malformed(form: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::MalformedForm { form: form.into(), reason: reason.into() }
    }
    pub fn mismatch(prim: impl Into<String>, msg: impl Into<String>) -> Self {
        EvalError::TypeMismatch { prim: prim.into(), msg: msg.into() }
    }
}
