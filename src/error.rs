use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationFailure;

/// Errors surfaced by workflow operations.
///
/// Informational outcomes such as "already initialized" or "phase complete"
/// are not errors; they are returned as ordinary results.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A required input was absent or blank. No state was touched.
    #[error("Missing '{0}'. Please provide it as a non-empty string.")]
    MissingInput(&'static str),

    /// A file, node, id, section or title could not be found.
    #[error("{0}")]
    NotFound(String),

    /// An artifact failed project constraint checks. Nothing was written.
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Reject absent or whitespace-only inputs.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::MissingInput(field));
    }
    Ok(trimmed)
}
