//! Error types for chain construction and stage execution.

use thiserror::Error;

/// Errors raised while assembling a chain from stage specifications.
///
/// Every variant is a build-time failure: when one is returned no chain
/// exists, and no stage from the failing build is kept alive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("stage '{0}' is not registered")]
    StageNotFound(String),

    #[error("stage '{stage}' is missing required parameters: {}", .missing.join(", "))]
    MissingParameters { stage: String, missing: Vec<String> },

    #[error("stage '{stage}': list parameter '{parameter}' {reason}")]
    InvalidListParameter {
        stage: String,
        parameter: String,
        reason: String,
    },

    #[error("stage '{stage}': parameter '{parameter}' {reason}")]
    InvalidParameter {
        stage: String,
        parameter: String,
        reason: String,
    },

    #[error("chain has no stages")]
    EmptyChain,
}

/// A constructor rejected one of its parameters.
///
/// The builder attaches the stage name and reports it as
/// [`ChainError::InvalidParameter`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parameter '{parameter}' {reason}")]
pub struct ParamError {
    pub parameter: String,
    pub reason: String,
}

impl ParamError {
    pub fn new(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        ParamError {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn into_chain_error(self, stage: &str) -> ChainError {
        ChainError::InvalidParameter {
            stage: stage.to_string(),
            parameter: self.parameter,
            reason: self.reason,
        }
    }
}

/// Fatal error raised by a stage while processing a record.
///
/// The executor never wraps or retries these; they reach the caller exactly
/// as the stage produced them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("{stage}: field '{field}' not found{}", context_suffix(.context))]
    MissingField {
        stage: String,
        field: String,
        context: Option<String>,
    },

    #[error("{stage}: shape mismatch, expected {expected:?} but found {found:?}")]
    ShapeMismatch {
        stage: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("{stage}: {reason}")]
    Failed { stage: String, reason: String },
}

/// Two execution traces of different chains cannot be merged.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "cannot merge a trace of [{}] into a trace of [{}]",
    .found.join(" | "),
    .expected.join(" | ")
)]
pub struct TraceMismatch {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" ({context})"),
        None => String::new(),
    }
}

impl StageError {
    pub fn failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        StageError::Failed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Name of the stage that raised the error.
    pub fn stage(&self) -> &str {
        match self {
            StageError::MissingField { stage, .. }
            | StageError::ShapeMismatch { stage, .. }
            | StageError::Failed { stage, .. } => stage,
        }
    }
}
