use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use session_engine::Message;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Serializes the conversation to `conversation-<timestamp>.json` under
/// `dir` and returns the path written.
pub fn export_history(history: &[Message], dir: &Path) -> anyhow::Result<PathBuf> {
    let stamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("formatting export timestamp")?
        .replace(':', "-");

    let path = dir.join(format!("conversation-{stamp}.json"));
    let payload =
        serde_json::to_string_pretty(history).context("serializing conversation history")?;

    fs::write(&path, payload)
        .with_context(|| format!("writing export file {}", path.display()))?;

    Ok(path)
}
