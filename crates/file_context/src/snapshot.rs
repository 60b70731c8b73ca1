use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// Window of leading bytes inspected by the binary-content heuristic.
const BINARY_SNIFF_BYTES: usize = 8192;
/// Minimum printable-byte ratio for a file to count as text.
const MIN_PRINTABLE_RATIO: f64 = 0.70;

/// A point-in-time copy of a file's content attached to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub content: String,
    pub size_bytes: u64,
}

/// Reads a snapshot of `path`, enforcing the size limit and rejecting files
/// that look like binary data.
pub fn read_snapshot(path: &Path, max_bytes: u64) -> Result<Snapshot, ResolveError> {
    let metadata =
        fs::metadata(path).map_err(|source| ResolveError::io("inspecting file", path, source))?;

    if metadata.len() > max_bytes {
        return Err(ResolveError::FileTooLarge {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            limit_bytes: max_bytes,
        });
    }

    let bytes =
        fs::read(path).map_err(|source| ResolveError::io("reading file", path, source))?;

    if looks_binary(&bytes) {
        return Err(ResolveError::BinaryContent {
            path: path.to_path_buf(),
        });
    }

    Ok(Snapshot {
        path: path.to_path_buf(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
        size_bytes: metadata.len(),
    })
}

/// Heuristic: a NUL byte anywhere in the sniff window, or too few printable
/// bytes, marks the file as binary.
#[must_use]
pub fn looks_binary(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if window.is_empty() {
        return false;
    }

    if window.contains(&0) {
        return true;
    }

    let printable = window
        .iter()
        .filter(|byte| byte.is_ascii_graphic() || byte.is_ascii_whitespace() || **byte >= 0x80)
        .count();

    (printable as f64) / (window.len() as f64) < MIN_PRINTABLE_RATIO
}
