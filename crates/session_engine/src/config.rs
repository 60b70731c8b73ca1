//! Immutable engine configuration.
//!
//! Loaded once at startup from an optional `config.json`; absent fields fall
//! back to the defaults below. The config is threaded by reference into
//! constructors rather than exposed as a global.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Hard cap on history length, enforced independently of token budgets.
    pub max_history_messages: usize,
    pub max_context_files: usize,
    /// Bound on tool-call rounds within a single user turn.
    pub max_reasoning_steps: usize,
    /// Ceiling on effective context capacity regardless of model profile.
    pub estimated_max_tokens: u64,
    pub context_warning_threshold: f64,
    pub aggressive_truncation_threshold: f64,
    pub min_fuzzy_score: u8,
    pub min_edit_score: u8,
    pub max_files_in_add_dir: usize,
    pub max_file_size_in_add_dir: u64,
    pub max_file_content_size_create: u64,
    /// Aggregate byte budget across all attached snapshots.
    pub max_multiple_read_size: u64,
    pub require_shell_confirmation: bool,
    pub shell_timeout_secs: u64,
    pub shell_max_output_bytes: usize,
    pub default_model: String,
    pub reasoner_model: String,
    pub excluded_files: Vec<String>,
    pub excluded_extensions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history_messages: 150,
            max_context_files: 12,
            max_reasoning_steps: 10,
            estimated_max_tokens: 120_000,
            context_warning_threshold: 0.7,
            aggressive_truncation_threshold: 0.85,
            min_fuzzy_score: 80,
            min_edit_score: 85,
            max_files_in_add_dir: 1000,
            max_file_size_in_add_dir: 5_000_000,
            max_file_content_size_create: 5_000_000,
            max_multiple_read_size: 100_000,
            require_shell_confirmation: true,
            shell_timeout_secs: 30,
            shell_max_output_bytes: 100 * 1024,
            default_model: "moonshotai/kimi-k2-instruct".to_string(),
            reasoner_model: "moonshotai/kimi-k2-instruct".to_string(),
            excluded_files: default_excluded_files(),
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `path`. A missing file yields the defaults;
    /// a present but malformed file is an error rather than a silent reset.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .map_err(|source| EngineError::config_io("reading config", path, source))?;

        serde_json::from_str(&raw).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn default_excluded_files() -> Vec<String> {
    [
        ".git",
        ".svn",
        ".hg",
        ".DS_Store",
        ".venv",
        "venv",
        "__pycache__",
        "node_modules",
        "target",
        "dist",
        "build",
        ".cache",
        ".idea",
        ".vscode",
        ".env",
        ".mypy_cache",
        ".pytest_cache",
    ]
    .iter()
    .map(|name| (*name).to_string())
    .collect()
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "pdf", "zip", "tar", "gz", "bz2", "7z",
        "rar", "exe", "dll", "so", "dylib", "bin", "obj", "o", "a", "class", "pyc", "pyo", "mp3",
        "mp4", "avi", "mov", "wav", "flac", "ttf", "otf", "woff", "woff2", "db", "sqlite",
    ]
    .iter()
    .map(|ext| (*ext).to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::EngineConfig;
    use crate::error::EngineError;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.max_history_messages, 150);
        assert_eq!(config.max_context_files, 12);
        assert_eq!(config.aggressive_truncation_threshold, 0.85);
        assert!(config.require_shell_confirmation);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_context_files": 3, "min_fuzzy_score": 70}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_context_files, 3);
        assert_eq!(config.min_fuzzy_score, 70);
        assert_eq!(config.max_history_messages, 150);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let error = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(error, EngineError::ConfigParse { .. }));
    }
}
