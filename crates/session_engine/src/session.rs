//! Session state: conversation history, attached file snapshots, and the
//! active model, with every mutation re-checked against the token budget.
//!
//! Mutations either fully apply or fully roll back. The one-per-process
//! session owns no I/O beyond snapshot reads during `add_file`.

use std::path::{Path, PathBuf};

use file_context::{read_snapshot, resolve, ResolverOptions, WalkFilter};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::message::{Message, Role};
use crate::models::{ModelProfile, ModelRegistry};
use crate::tokens;
use crate::truncation::{enforce_budget, total_tokens, TruncationReport};

/// A file snapshot attached to the conversation. Unique by path; re-adding
/// refreshes both the content and the recency ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFile {
    pub path: PathBuf,
    pub content: String,
    pub size_bytes: u64,
    /// Monotonic attach ordinal; smallest is evicted first under pressure.
    pub added_at: u64,
    pub estimated_tokens: u64,
}

/// Point-in-time usage statistics for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextInfo {
    pub model_id: String,
    pub message_count: usize,
    pub file_count: usize,
    pub estimated_tokens: u64,
    pub capacity: u64,
    pub usage_percent: f64,
    pub approaching_limit: bool,
    pub critical_limit: bool,
}

pub struct Session {
    config: EngineConfig,
    registry: ModelRegistry,
    root: PathBuf,
    history: Vec<Message>,
    files: Vec<ContextFile>,
    active_model: ModelProfile,
    fuzzy_enabled: bool,
    next_ordinal: u64,
}

impl Session {
    pub fn new(
        config: EngineConfig,
        registry: ModelRegistry,
        root: impl Into<PathBuf>,
        system_prompt: Option<String>,
    ) -> Result<Self, EngineError> {
        let root = root.into();
        let root = root
            .canonicalize()
            .map_err(|source| EngineError::config_io("resolving project root", &root, source))?;

        let active_model = registry.default_profile().clone();
        let history = system_prompt
            .map(|prompt| vec![Message::new(Role::System, prompt)])
            .unwrap_or_default();

        Ok(Self {
            config,
            registry,
            root,
            history,
            files: Vec::new(),
            active_model,
            fuzzy_enabled: false,
            next_ordinal: 0,
        })
    }

    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    #[must_use]
    pub fn files(&self) -> &[ContextFile] {
        &self.files
    }

    #[must_use]
    pub fn active_model(&self) -> &ModelProfile {
        &self.active_model
    }

    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn fuzzy_enabled(&self) -> bool {
        self.fuzzy_enabled
    }

    #[must_use]
    pub fn estimated_tokens(&self) -> u64 {
        total_tokens(&self.history, &self.files)
    }

    /// Effective token capacity: the model profile, capped by configuration.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.active_model
            .context_tokens
            .min(self.config.estimated_max_tokens)
    }

    pub fn append_user_message(
        &mut self,
        content: impl Into<String>,
    ) -> Result<TruncationReport, EngineError> {
        self.append(Message::new(Role::User, content))
    }

    pub fn append_assistant_message(
        &mut self,
        content: impl Into<String>,
    ) -> Result<TruncationReport, EngineError> {
        self.append(Message::new(Role::Assistant, content))
    }

    /// Appends exactly one tool-result message for a finished tool call.
    pub fn append_tool_message(
        &mut self,
        content: impl Into<String>,
        call_id: impl Into<String>,
    ) -> Result<TruncationReport, EngineError> {
        self.append(Message::tool(content, call_id))
    }

    fn append(&mut self, message: Message) -> Result<TruncationReport, EngineError> {
        let checkpoint = self.checkpoint();
        self.history.push(message);
        self.enforce_or_restore(checkpoint)
    }

    /// Re-runs budget enforcement without mutating inputs; called before
    /// every transport dispatch.
    pub fn prepare_for_dispatch(&mut self) -> Result<TruncationReport, EngineError> {
        let checkpoint = self.checkpoint();
        self.enforce_or_restore(checkpoint)
    }

    /// Resolves `pattern` and attaches the best candidate's snapshot.
    ///
    /// Re-adding an attached path replaces its snapshot and refreshes its
    /// eviction ordinal; it does not count against the file limit.
    pub fn add_file(&mut self, pattern: &str) -> Result<AddOutcome, EngineError> {
        let options = ResolverOptions {
            fuzzy_enabled: self.fuzzy_enabled,
            min_fuzzy_score: self.config.min_fuzzy_score,
            max_walk_entries: self.config.max_files_in_add_dir,
        };
        let filter = self.walk_filter();

        let candidates = resolve(pattern, &self.root, &filter, options)?;
        let chosen = candidates[0].clone();

        let snapshot = read_snapshot(&chosen.path, self.config.max_file_size_in_add_dir)?;

        let existing = self
            .files
            .iter()
            .position(|file| file.path == snapshot.path);

        if existing.is_none() && self.files.len() >= self.config.max_context_files {
            return Err(EngineError::ContextFileLimitExceeded {
                limit: self.config.max_context_files,
            });
        }

        let other_bytes: u64 = self
            .files
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != existing)
            .map(|(_, file)| file.size_bytes)
            .sum();
        if other_bytes + snapshot.size_bytes > self.config.max_multiple_read_size {
            return Err(EngineError::SnapshotBudgetExceeded {
                pattern: pattern.to_string(),
                limit_bytes: self.config.max_multiple_read_size,
            });
        }

        let checkpoint = self.checkpoint();
        let estimated_tokens = tokens::estimate(&snapshot.content);
        let entry = ContextFile {
            path: snapshot.path.clone(),
            content: snapshot.content,
            size_bytes: snapshot.size_bytes,
            added_at: self.next_ordinal,
            estimated_tokens,
        };
        self.next_ordinal += 1;

        match existing {
            Some(index) => self.files[index] = entry,
            None => self.files.push(entry),
        }

        let report = self.enforce_or_restore(checkpoint)?;
        info!(path = %snapshot.path.display(), score = chosen.score, "attached file");

        Ok(AddOutcome {
            path: snapshot.path,
            score: chosen.score,
            report,
        })
    }

    /// Detaches an attached file. Matches by path suffix or basename first,
    /// falling back to fuzzy similarity when enabled.
    pub fn remove_file(&mut self, pattern: &str) -> Result<PathBuf, EngineError> {
        let index = self
            .find_attached_exact(pattern)
            .or_else(|| self.find_attached_fuzzy(pattern))
            .ok_or_else(|| EngineError::FileNotAttached {
                pattern: pattern.to_string(),
            })?;

        let removed = self.files.remove(index);
        Ok(removed.path)
    }

    /// Switches the active model. A downgrade immediately re-applies the
    /// budget for the new capacity; failure restores the previous model.
    pub fn switch_model(
        &mut self,
        id: &str,
    ) -> Result<(ModelProfile, TruncationReport), EngineError> {
        let profile = self.registry.resolve(id)?.clone();

        let checkpoint = self.checkpoint();
        let previous = std::mem::replace(&mut self.active_model, profile.clone());

        match self.enforce_or_restore(checkpoint) {
            Ok(report) => Ok((profile, report)),
            Err(error) => {
                self.active_model = previous;
                Err(error)
            }
        }
    }

    /// Toggles between the reasoner profile and the default profile.
    pub fn toggle_reasoner(&mut self) -> Result<(ModelProfile, TruncationReport), EngineError> {
        let reasoner_id = self.registry.reasoner_profile().id.clone();
        let default_id = self.registry.default_profile().id.clone();

        let target = if self.active_model.id == reasoner_id {
            default_id
        } else {
            reasoner_id
        };

        self.switch_model(&target)
    }

    pub fn toggle_fuzzy(&mut self) -> bool {
        self.fuzzy_enabled = !self.fuzzy_enabled;
        self.fuzzy_enabled
    }

    /// Drops all history except the system prompt, and every attached file.
    /// The active model is retained.
    pub fn clear(&mut self) {
        self.history.retain(Message::is_system);
        self.files.clear();
    }

    #[must_use]
    pub fn context_info(&self) -> ContextInfo {
        let estimated_tokens = self.estimated_tokens();
        let capacity = self.capacity();
        let usage = if capacity == 0 {
            0.0
        } else {
            estimated_tokens as f64 / capacity as f64
        };

        ContextInfo {
            model_id: self.active_model.id.clone(),
            message_count: self.history.len(),
            file_count: self.files.len(),
            estimated_tokens,
            capacity,
            usage_percent: usage * 100.0,
            approaching_limit: usage >= self.config.context_warning_threshold,
            critical_limit: usage >= self.config.aggressive_truncation_threshold,
        }
    }

    /// Renders attached snapshots as one block for dispatch, or `None` when
    /// nothing is attached.
    #[must_use]
    pub fn render_file_context(&self) -> Option<String> {
        if self.files.is_empty() {
            return None;
        }

        let mut block = String::from("Attached project files:\n");
        for file in &self.files {
            let display = file
                .path
                .strip_prefix(&self.root)
                .unwrap_or(&file.path)
                .display();
            block.push_str(&format!("\n--- {display} ---\n{}\n", file.content));
        }

        Some(block)
    }

    #[must_use]
    pub fn walk_filter(&self) -> WalkFilter {
        WalkFilter::new(
            self.config.excluded_files.clone(),
            self.config.excluded_extensions.clone(),
        )
    }

    /// Captures history and files for later rollback, e.g. around a
    /// transport call that may fail mid-turn.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            history: self.history.clone(),
            files: self.files.clone(),
        }
    }

    /// Restores a previously captured snapshot.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.history = snapshot.history;
        self.files = snapshot.files;
    }

    fn checkpoint(&self) -> (Vec<Message>, Vec<ContextFile>) {
        (self.history.clone(), self.files.clone())
    }

    fn enforce_or_restore(
        &mut self,
        checkpoint: (Vec<Message>, Vec<ContextFile>),
    ) -> Result<TruncationReport, EngineError> {
        let capacity = self.capacity();
        match enforce_budget(
            &mut self.history,
            &mut self.files,
            capacity,
            &self.config,
        ) {
            Ok(report) => Ok(report),
            Err(error) => {
                self.history = checkpoint.0;
                self.files = checkpoint.1;
                Err(error)
            }
        }
    }

    fn find_attached_exact(&self, pattern: &str) -> Option<usize> {
        self.files.iter().position(|file| {
            let relative = file.path.strip_prefix(&self.root).unwrap_or(&file.path);
            relative == Path::new(pattern)
                || file.path == Path::new(pattern)
                || file
                    .path
                    .file_name()
                    .is_some_and(|name| name == Path::new(pattern).as_os_str())
        })
    }

    fn find_attached_fuzzy(&self, pattern: &str) -> Option<usize> {
        if !self.fuzzy_enabled {
            return None;
        }

        self.files
            .iter()
            .enumerate()
            .filter_map(|(index, file)| {
                let relative = file
                    .path
                    .strip_prefix(&self.root)
                    .unwrap_or(&file.path)
                    .to_string_lossy()
                    .into_owned();
                let score = file_context::pattern_score(pattern, &relative);
                (score >= self.config.min_fuzzy_score).then_some((index, score))
            })
            .max_by_key(|(_, score)| *score)
            .map(|(index, _)| index)
    }
}

/// Result of a successful `add_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub path: PathBuf,
    pub score: u8,
    pub report: TruncationReport,
}

/// Opaque rollback point captured by [`Session::snapshot`].
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    history: Vec<Message>,
    files: Vec<ContextFile>,
}
