use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown model '{id}'")]
    UnknownModel { id: String },

    #[error("context file limit reached ({limit}); remove a file before adding another")]
    ContextFileLimitExceeded { limit: usize },

    #[error(
        "a {tokens}-token message cannot fit the {capacity}-token context even after dropping all history and files"
    )]
    ContextUnshrinkable { tokens: u64, capacity: u64 },

    #[error("no attached file matches '{pattern}'")]
    FileNotAttached { pattern: String },

    #[error("adding '{pattern}' would exceed the {limit_bytes}-byte aggregate snapshot budget")]
    SnapshotBudgetExceeded { pattern: String, limit_bytes: u64 },

    #[error(transparent)]
    Resolve(#[from] file_context::ResolveError),

    #[error("I/O error while {operation} at {path}: {source}")]
    ConfigIo {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    #[must_use]
    pub fn unknown_model(id: impl Into<String>) -> Self {
        Self::UnknownModel { id: id.into() }
    }

    #[must_use]
    pub fn config_io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::ConfigIo {
            operation,
            path: path.into(),
            source,
        }
    }
}
