use std::path::PathBuf;

use thiserror::Error;

/// Stable classification carried on failed tool results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToolCall,
    PathRejected,
    FileTooLarge,
    NoEditMatch,
    AmbiguousEdit,
    ShellTimeout,
    Denied,
    NonZeroExit,
    Io,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("invalid arguments for tool '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("path '{path}' rejected: {reason}")]
    PathRejected { path: String, reason: String },

    #[error("file {path} is {size_bytes} bytes, over the {limit_bytes}-byte limit")]
    FileTooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("no region of {path} matches the requested snippet (best score {best_score}, needed {min_score})")]
    NoEditMatch {
        path: PathBuf,
        best_score: u8,
        min_score: u8,
    },

    #[error("snippet matches {matches} near-identical regions of {path}; provide more surrounding context")]
    AmbiguousEdit { path: PathBuf, matches: usize },

    #[error("command timed out after {timeout_secs}s")]
    ShellTimeout { timeout_secs: u64 },

    #[error("command execution denied at the confirmation prompt")]
    Denied,

    #[error("command exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    #[must_use]
    pub fn invalid_arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn path_rejected(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathRejected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool { .. } | Self::InvalidArguments { .. } => ErrorKind::InvalidToolCall,
            Self::PathRejected { .. } => ErrorKind::PathRejected,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::NoEditMatch { .. } => ErrorKind::NoEditMatch,
            Self::AmbiguousEdit { .. } => ErrorKind::AmbiguousEdit,
            Self::ShellTimeout { .. } => ErrorKind::ShellTimeout,
            Self::Denied => ErrorKind::Denied,
            Self::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
