//! Token-budget enforcement over conversation history and attached files.
//!
//! The budget ceiling is `capacity x aggressive_truncation_threshold`. Above
//! that, whole turns are evicted oldest-first (a user message together with
//! the assistant/tool replies that follow it). Between the warning and
//! aggressive thresholds, single oldest messages are trimmed with a warning.
//! When history alone cannot get under budget, attached file snapshots are
//! evicted least-recently-added first. System messages are never dropped, and
//! the most recent turns are preserved unless the budget leaves no choice.

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::message::{Message, Role};
use crate::session::ContextFile;

/// What one enforcement pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruncationReport {
    pub dropped_messages: usize,
    pub evicted_files: usize,
    pub warning: Option<String>,
}

impl TruncationReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.dropped_messages == 0 && self.evicted_files == 0 && self.warning.is_none()
    }
}

/// Brings `history` and `files` under the token budget for `capacity`.
///
/// Idempotent: a second pass over unchanged state is a no-op. Fails with
/// `ContextUnshrinkable` only when the irreducible remainder (system prompt
/// plus the newest message) still exceeds the budget.
pub(crate) fn enforce_budget(
    history: &mut Vec<Message>,
    files: &mut Vec<ContextFile>,
    capacity: u64,
    config: &EngineConfig,
) -> Result<TruncationReport, EngineError> {
    let mut report = TruncationReport::default();
    let mut soft_trims = 0usize;

    // The message-count cap is independent of token budgets and of the
    // recent-turn floor; only the system prompt is spared.
    while history.len() > config.max_history_messages {
        let Some(index) = history.iter().position(|message| !message.is_system()) else {
            break;
        };
        history.remove(index);
        report.dropped_messages += 1;
    }

    let warning_budget = threshold_tokens(capacity, config.context_warning_threshold);
    let aggressive_budget = threshold_tokens(capacity, config.aggressive_truncation_threshold);

    loop {
        let total = total_tokens(history, files);
        if total <= warning_budget {
            break;
        }

        let protected = protected_start(history, config);

        if total > aggressive_budget {
            let dropped = drop_oldest_turn(history, protected);
            if dropped > 0 {
                debug!(dropped, total, "aggressive turn eviction");
                report.dropped_messages += dropped;
                continue;
            }
        } else if drop_oldest_single(history, protected) {
            report.dropped_messages += 1;
            soft_trims += 1;
            continue;
        }

        if let Some(evicted) = evict_oldest_file(files) {
            debug!(path = %evicted.path.display(), "evicted least-recently-added file");
            report.evicted_files += 1;
            continue;
        }

        break;
    }

    // The recent-turn floor yields to the hard budget when nothing else can.
    loop {
        let total = total_tokens(history, files);
        if total <= aggressive_budget {
            break;
        }

        let droppable = history
            .iter()
            .position(|message| !message.is_system())
            .filter(|index| *index + 1 < history.len());

        match droppable {
            Some(index) => {
                history.remove(index);
                report.dropped_messages += 1;
            }
            None => {
                return Err(EngineError::ContextUnshrinkable {
                    tokens: total,
                    capacity,
                });
            }
        }
    }

    if soft_trims > 0 {
        let message = format!(
            "context usage passed the warning threshold; trimmed {soft_trims} oldest message(s)"
        );
        warn!(soft_trims, "{message}");
        report.warning = Some(message);
    }

    Ok(report)
}

pub(crate) fn total_tokens(history: &[Message], files: &[ContextFile]) -> u64 {
    let history_tokens: u64 = history.iter().map(|message| message.estimated_tokens).sum();
    let file_tokens: u64 = files.iter().map(|file| file.estimated_tokens).sum();
    history_tokens + file_tokens
}

fn threshold_tokens(capacity: u64, threshold: f64) -> u64 {
    (capacity as f64 * threshold).floor() as u64
}

/// Index of the first message in the protected recent tail. Everything at or
/// after this index is off-limits to ordinary trimming.
fn protected_start(history: &[Message], config: &EngineConfig) -> usize {
    let floor_turns = (config.max_reasoning_steps / 2).max(2);

    let mut seen_user_turns = 0usize;
    for (index, message) in history.iter().enumerate().rev() {
        if message.role == Role::User {
            seen_user_turns += 1;
            if seen_user_turns == floor_turns {
                return index;
            }
        }
    }

    // Fewer turns than the floor: protect all of them.
    history
        .iter()
        .position(|message| !message.is_system())
        .unwrap_or(history.len())
}

/// Removes the oldest unprotected turn: a user message and every assistant or
/// tool message that follows it up to the next user message. An orphaned
/// assistant/tool head is removed on its own. Returns how many messages went.
fn drop_oldest_turn(history: &mut Vec<Message>, protected: usize) -> usize {
    let Some(start) = history
        .iter()
        .position(|message| !message.is_system())
        .filter(|index| *index < protected)
    else {
        return 0;
    };

    let mut end = start + 1;
    if history[start].role == Role::User {
        while end < protected && end < history.len() {
            match history[end].role {
                Role::Assistant | Role::Tool => end += 1,
                Role::User | Role::System => break,
            }
        }
    }

    history.drain(start..end);
    end - start
}

fn drop_oldest_single(history: &mut Vec<Message>, protected: usize) -> bool {
    let Some(index) = history
        .iter()
        .position(|message| !message.is_system())
        .filter(|index| *index < protected)
    else {
        return false;
    };

    history.remove(index);
    true
}

fn evict_oldest_file(files: &mut Vec<ContextFile>) -> Option<ContextFile> {
    let oldest = files
        .iter()
        .enumerate()
        .min_by_key(|(_, file)| file.added_at)
        .map(|(index, _)| index)?;

    Some(files.remove(oldest))
}
