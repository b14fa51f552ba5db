//! Compilation errors.

use conveyor_core::SourceError;
use thiserror::Error;

/// Where an unresolved template reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefScope {
    /// A reference inside the named stage.
    Stage(String),
    /// A reference at the given position in the top-level step sequence.
    Step(usize),
}

impl std::fmt::Display for RefScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefScope::Stage(name) => write!(f, "stage '{}'", name),
            RefScope::Step(position) => write!(f, "top-level step {}", position),
        }
    }
}

/// An error from a single compilation phase.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("KDL parse error: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("configuration is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("duplicate definition: {0}")]
    Duplicate(String),

    #[error("unknown template '{template}' referenced from {scope}")]
    UnresolvedTemplate { scope: RefScope, template: String },
}

pub type CompilerResult<T> = std::result::Result<T, CompilerError>;

/// A compilation failure, annotated with the phase that produced it.
///
/// The orchestrator wraps each phase's error exactly once; nothing is
/// retried or downgraded. The API layer maps these to response severities.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unable to get pipeline configuration: {0}")]
    ConfigUnavailable(#[from] SourceError),

    #[error("unable to parse pipeline configuration: {0}")]
    Parse(#[source] CompilerError),

    #[error("unable to validate pipeline: {0}")]
    Validation(#[source] CompilerError),

    #[error("unable to expand stages: {0}")]
    ExpandStages(#[source] CompilerError),

    #[error("unable to expand steps: {0}")]
    ExpandSteps(#[source] CompilerError),
}
