use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("insufficient data: need at least {needed} aligned points, found {found}")]
    InsufficientData { needed: usize, found: usize },

    #[error("failed to load checkpoint {}: {reason}", path.display())]
    Checkpoint { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub fn shape(context: impl Into<String>, expected: usize, found: usize) -> Self {
        EvalError::ShapeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Short stable label used when logging a skipped checkpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::NotFound(_) => "not_found",
            EvalError::ShapeMismatch { .. } => "shape_mismatch",
            EvalError::InsufficientData { .. } => "insufficient_data",
            EvalError::Checkpoint { .. } => "checkpoint",
            EvalError::Inference(_) => "inference",
            EvalError::Config(_) => "config",
            EvalError::Io(_) => "io",
            EvalError::Csv(_) => "csv",
            EvalError::Json(_) => "json",
        }
    }
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "../tests/src_inline/error.rs"]
mod tests;
