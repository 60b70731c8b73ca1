use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no file matches '{pattern}' under {root}")]
    NoMatch { pattern: String, root: PathBuf },

    #[error("file {path} is {size_bytes} bytes, over the {limit_bytes}-byte limit")]
    FileTooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("file {path} looks like binary content and cannot be attached as text")]
    BinaryContent { path: PathBuf },

    #[error("path {path} resolves outside the project root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn no_match(pattern: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self::NoMatch {
            pattern: pattern.into(),
            root: root.into(),
        }
    }
}
