//! Minimal provider-agnostic contract for one model completion call.
//!
//! This crate intentionally defines only the seam the session engine talks
//! through: an ordered message view, tool definition/request envelopes, and
//! the [`ModelTransport`] trait. Provider wire formats, streaming, and
//! retries live behind implementations, not here.

use std::collections::VecDeque;

use serde_json::Value;
use thiserror::Error;

/// Role of one wire-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Provider-neutral view of one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    #[must_use]
    pub fn new(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
        }
    }
}

/// Host-mediated tool definition advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Request envelope for one host tool call emitted by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Value,
}

/// What the model produced for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutput {
    /// Final assistant text; the turn is done.
    Assistant { text: String },
    /// The model wants tools executed before continuing.
    ToolCalls {
        assistant_text: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure: {reason}")]
    Failed { reason: String },

    #[error("transport exhausted its scripted responses")]
    ScriptExhausted,
}

impl TransportError {
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// One blocking completion call against a model.
pub trait ModelTransport {
    fn complete(
        &mut self,
        model_id: &str,
        messages: &[WireMessage],
        tools: &[ToolDefinition],
    ) -> Result<TurnOutput, TransportError>;
}

/// Deterministic transport that replays a fixed script; for tests and
/// offline runs.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Result<TurnOutput, TransportError>>,
    pub calls_seen: usize,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = TurnOutput>) -> Self {
        Self {
            script: script.into_iter().map(Ok).collect(),
            calls_seen: 0,
        }
    }

    pub fn push(&mut self, output: TurnOutput) {
        self.script.push_back(Ok(output));
    }

    pub fn push_error(&mut self, error: TransportError) {
        self.script.push_back(Err(error));
    }
}

impl ModelTransport for ScriptedTransport {
    fn complete(
        &mut self,
        _model_id: &str,
        _messages: &[WireMessage],
        _tools: &[ToolDefinition],
    ) -> Result<TurnOutput, TransportError> {
        self.calls_seen += 1;
        self.script
            .pop_front()
            .unwrap_or(Err(TransportError::ScriptExhausted))
    }
}
