use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use file_context::WalkFilter;
use serde_json::Value;
use tracing::debug;
use wait_timeout::ChildExt;

use crate::call::ToolCall;
use crate::edit::apply_anchor_edit;
use crate::error::{ErrorKind, ToolError};

/// Answers the confirmation prompt for gated tool calls.
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Gate that approves everything; for non-interactive use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Execution limits, all overridable from engine configuration.
#[derive(Debug, Clone)]
pub struct ToolLimits {
    pub read_max_bytes: u64,
    pub create_max_bytes: u64,
    pub min_edit_score: u8,
    pub shell_timeout_secs: u64,
    pub shell_max_output_bytes: usize,
    pub require_shell_confirmation: bool,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            read_max_bytes: 200 * 1024,
            create_max_bytes: 5_000_000,
            min_edit_score: 85,
            shell_timeout_secs: 30,
            shell_max_output_bytes: 100 * 1024,
            require_shell_confirmation: true,
        }
    }
}

/// Terminal result of one tool call. Failures carry a stable kind so the
/// caller can relay a classified tool message without parsing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: String,
    pub error_kind: Option<ErrorKind>,
}

impl ToolOutcome {
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error_kind: None,
        }
    }

    #[must_use]
    pub fn fail(error: &ToolError) -> Self {
        Self {
            success: false,
            output: error.to_string(),
            error_kind: Some(error.kind()),
        }
    }

    #[must_use]
    pub fn fail_with(output: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            output: output.into(),
            error_kind: Some(kind),
        }
    }
}

/// Executes validated tool calls inside a canonical project root.
pub struct ToolGateway<G: ConfirmationGate> {
    root: PathBuf,
    filter: WalkFilter,
    limits: ToolLimits,
    gate: G,
}

impl<G: ConfirmationGate> ToolGateway<G> {
    pub fn new(
        root: impl Into<PathBuf>,
        filter: WalkFilter,
        limits: ToolLimits,
        gate: G,
    ) -> Result<Self, ToolError> {
        let root = root.into();
        let root = root
            .canonicalize()
            .map_err(|source| ToolError::io("resolving project root", &root, source))?;

        if !root.is_dir() {
            return Err(ToolError::path_rejected(
                root.display().to_string(),
                "project root must be a directory",
            ));
        }

        Ok(Self {
            root,
            filter,
            limits,
            gate,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates a raw envelope and executes it. Never panics; every failure
    /// becomes a classified outcome.
    pub fn dispatch(&mut self, name: &str, arguments: &Value) -> ToolOutcome {
        debug!(tool = name, "tool call received");
        let call = match ToolCall::parse(name, arguments) {
            Ok(call) => call,
            Err(error) => return ToolOutcome::fail(&error),
        };

        self.execute(call)
    }

    pub fn execute(&mut self, call: ToolCall) -> ToolOutcome {
        debug!(tool = call.name(), "tool call validated");

        if call.requires_confirmation() && self.limits.require_shell_confirmation {
            let prompt = match &call {
                ToolCall::RunShell { command } => format!("Run shell command? {command}"),
                _ => format!("Run tool '{}'?", call.name()),
            };

            if !self.gate.confirm(&prompt) {
                debug!(tool = call.name(), "tool call denied");
                return ToolOutcome::fail(&ToolError::Denied);
            }
        }

        debug!(tool = call.name(), "tool call executing");
        let outcome = match call {
            ToolCall::ReadFile { path } => self.read_file(&path),
            ToolCall::CreateFile { path, content } => self.create_file(&path, &content),
            ToolCall::EditFile {
                path,
                original_snippet,
                new_snippet,
            } => self.edit_file(&path, &original_snippet, &new_snippet),
            ToolCall::RunShell { command } => self.run_shell(&command),
        };

        debug!(
            success = outcome.success,
            kind = ?outcome.error_kind,
            "tool call finished"
        );
        outcome
    }

    fn read_file(&self, path: &str) -> ToolOutcome {
        match self.try_read_file(path) {
            Ok(content) => ToolOutcome::ok(content),
            Err(error) => ToolOutcome::fail(&error),
        }
    }

    fn try_read_file(&self, path: &str) -> Result<String, ToolError> {
        let resolved = self.resolve_existing_path(path)?;

        let metadata = fs::metadata(&resolved)
            .map_err(|source| ToolError::io("inspecting file", &resolved, source))?;
        if metadata.len() > self.limits.read_max_bytes {
            return Err(ToolError::FileTooLarge {
                path: resolved,
                size_bytes: metadata.len(),
                limit_bytes: self.limits.read_max_bytes,
            });
        }

        let bytes = fs::read(&resolved)
            .map_err(|source| ToolError::io("reading file", &resolved, source))?;
        if file_context::looks_binary(&bytes) {
            return Err(ToolError::path_rejected(path, "binary content"));
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn create_file(&self, path: &str, content: &str) -> ToolOutcome {
        match self.try_create_file(path, content) {
            Ok(resolved) => ToolOutcome::ok(format!("Created {}", resolved.display())),
            Err(error) => ToolOutcome::fail(&error),
        }
    }

    fn try_create_file(&self, path: &str, content: &str) -> Result<PathBuf, ToolError> {
        if content.len() as u64 > self.limits.create_max_bytes {
            return Err(ToolError::FileTooLarge {
                path: PathBuf::from(path),
                size_bytes: content.len() as u64,
                limit_bytes: self.limits.create_max_bytes,
            });
        }

        let resolved = self.resolve_write_path(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ToolError::io("creating parent directories", parent, source))?;
        }

        write_atomic(&resolved, content)?;
        Ok(resolved)
    }

    fn edit_file(&self, path: &str, original_snippet: &str, new_snippet: &str) -> ToolOutcome {
        match self.try_edit_file(path, original_snippet, new_snippet) {
            Ok((resolved, score)) => ToolOutcome::ok(format!(
                "Updated {} (match score {score})",
                resolved.display()
            )),
            Err(error) => ToolOutcome::fail(&error),
        }
    }

    fn try_edit_file(
        &self,
        path: &str,
        original_snippet: &str,
        new_snippet: &str,
    ) -> Result<(PathBuf, u8), ToolError> {
        let resolved = self.resolve_existing_path(path)?;

        let content = fs::read_to_string(&resolved)
            .map_err(|source| ToolError::io("reading file", &resolved, source))?;

        let (updated, score) = apply_anchor_edit(
            &resolved,
            &content,
            original_snippet,
            new_snippet,
            self.limits.min_edit_score,
        )?;

        write_atomic(&resolved, &updated)?;
        Ok((resolved, score))
    }

    fn run_shell(&self, command: &str) -> ToolOutcome {
        let mut child = match Command::new("bash")
            .arg("-c")
            .arg(command)
            .current_dir(&self.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                return ToolOutcome::fail_with(
                    format!("failed to launch shell: {error}"),
                    ErrorKind::Io,
                );
            }
        };

        // Drain both pipes while waiting. A child producing more than the
        // OS pipe buffer would otherwise block on a full pipe and get
        // reported as a timeout.
        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());

        let timeout = Duration::from_secs(self.limits.shell_timeout_secs);
        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return ToolOutcome::fail(&ToolError::ShellTimeout {
                    timeout_secs: self.limits.shell_timeout_secs,
                });
            }
            Err(error) => {
                let _ = child.kill();
                return ToolOutcome::fail_with(
                    format!("failed waiting for shell command: {error}"),
                    ErrorKind::Io,
                );
            }
        };

        let stdout = join_pipe_reader(stdout_reader);
        let stderr = join_pipe_reader(stderr_reader);
        let exit_code = status.code().unwrap_or(-1);

        let output = truncate_to_byte_limit(
            format!(
                "stdout:\n{}\nstderr:\n{}\nExit code: {exit_code}",
                String::from_utf8_lossy(&stdout),
                String::from_utf8_lossy(&stderr)
            ),
            self.limits.shell_max_output_bytes,
        );

        if status.success() {
            ToolOutcome::ok(output)
        } else {
            ToolOutcome::fail_with(output, ErrorKind::NonZeroExit)
        }
    }

    fn resolve_existing_path(&self, path: &str) -> Result<PathBuf, ToolError> {
        if path.trim().is_empty() {
            return Err(ToolError::path_rejected(path, "path must not be empty"));
        }

        let candidate = self.absolute_candidate(path);
        let canonical = candidate
            .canonicalize()
            .map_err(|source| ToolError::io("resolving path", &candidate, source))?;

        self.ensure_inside_root(path, &canonical)?;
        self.ensure_not_excluded(path, &canonical)?;
        Ok(canonical)
    }

    fn resolve_write_path(&self, path: &str) -> Result<PathBuf, ToolError> {
        if path.trim().is_empty() {
            return Err(ToolError::path_rejected(path, "path must not be empty"));
        }

        // Write targets may not exist yet, so `..` must be resolved
        // lexically before anything on disk is consulted; otherwise a
        // traversal hidden behind a missing directory sails past the
        // existing-ancestor check.
        let candidate = normalize_lexically(&self.absolute_candidate(path))
            .ok_or_else(|| ToolError::path_rejected(path, "traverses above the filesystem root"))?;
        self.ensure_inside_root(path, &candidate)?;

        let parent = candidate
            .parent()
            .ok_or_else(|| ToolError::path_rejected(path, "path has no parent directory"))?;

        // Symlinks in the existing part can still point out of the root.
        let anchor = canonicalize_existing_ancestor(parent)?;
        self.ensure_inside_root(path, &anchor)?;
        self.ensure_not_excluded(path, &candidate)?;

        Ok(candidate)
    }

    fn absolute_candidate(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_inside_root(&self, raw: &str, canonical: &Path) -> Result<(), ToolError> {
        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            Err(ToolError::path_rejected(raw, "escapes the project root"))
        }
    }

    fn ensure_not_excluded(&self, raw: &str, resolved: &Path) -> Result<(), ToolError> {
        let relative = resolved.strip_prefix(&self.root).unwrap_or(resolved);
        if self.filter.is_excluded(relative) {
            Err(ToolError::path_rejected(raw, "matches an excluded pattern"))
        } else {
            Ok(())
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ToolError> {
    let parent = path
        .parent()
        .ok_or_else(|| ToolError::path_rejected(path.display().to_string(), "no parent"))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let temp = parent.join(format!(".{name}.tmp-{}", std::process::id()));

    fs::write(&temp, content)
        .map_err(|source| ToolError::io("writing temp file", &temp, source))?;

    if let Err(source) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(ToolError::io("renaming temp file", path, source));
    }

    Ok(())
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = pipe.read_to_end(&mut bytes);
            bytes
        })
    })
}

fn join_pipe_reader(reader: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn truncate_to_byte_limit(content: String, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content;
    }

    let mut cutoff = max_bytes.min(content.len());
    while cutoff > 0 && !content.is_char_boundary(cutoff) {
        cutoff -= 1;
    }

    let mut truncated = content[..cutoff].to_string();
    truncated.push_str("\n[truncated]");
    truncated
}

fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::Normal(name) => normalized.push(name),
        }
    }

    Some(normalized)
}

fn canonicalize_existing_ancestor(path: &Path) -> Result<PathBuf, ToolError> {
    for ancestor in path.ancestors() {
        if ancestor.exists() {
            return ancestor
                .canonicalize()
                .map_err(|source| ToolError::io("resolving path", ancestor, source));
        }
    }

    Err(ToolError::path_rejected(
        path.display().to_string(),
        "no existing ancestor",
    ))
}
