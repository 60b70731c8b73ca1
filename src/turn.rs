//! One user turn: append, truncate, dispatch, and the bounded tool loop.

use model_transport::{ModelTransport, TransportError, TurnOutput, WireMessage, WireRole};
use session_engine::{EngineError, Role, Session};
use thiserror::Error;
use tool_gateway::{ConfirmationGate, ToolGateway};
use tracing::debug;

use crate::tools::builtin_tool_definitions;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The transport call failed; the session was restored to its state
    /// before the turn so the prompt can simply be retried.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What a completed turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub assistant_text: String,
    pub tool_rounds: usize,
    pub step_limit_reached: bool,
    pub warnings: Vec<String>,
}

/// Runs one full user turn against the transport, executing requested tool
/// calls through the gateway until the model produces final text or the
/// reasoning-step bound is hit.
pub fn run_turn<T, G>(
    session: &mut Session,
    transport: &mut T,
    gateway: &mut ToolGateway<G>,
    prompt: &str,
) -> Result<TurnSummary, TurnError>
where
    T: ModelTransport + ?Sized,
    G: ConfirmationGate,
{
    let checkpoint = session.snapshot();
    let mut warnings = Vec::new();
    let max_steps = session.config().max_reasoning_steps;
    let definitions = builtin_tool_definitions();

    let report = session.append_user_message(prompt)?;
    if let Some(warning) = report.warning {
        warnings.push(warning);
    }

    let mut tool_rounds = 0usize;

    loop {
        if let Some(warning) = session.prepare_for_dispatch()?.warning {
            warnings.push(warning);
        }

        let model_id = session.active_model().id.clone();
        let wire = wire_history(session);

        let output = match transport.complete(&model_id, &wire, &definitions) {
            Ok(output) => output,
            Err(error) => {
                session.restore(checkpoint);
                return Err(error.into());
            }
        };

        match output {
            TurnOutput::Assistant { text } => {
                let report = session.append_assistant_message(&text)?;
                if let Some(warning) = report.warning {
                    warnings.push(warning);
                }

                return Ok(TurnSummary {
                    assistant_text: text,
                    tool_rounds,
                    step_limit_reached: false,
                    warnings,
                });
            }
            TurnOutput::ToolCalls {
                assistant_text,
                calls,
            } => {
                if let Some(text) = assistant_text.filter(|text| !text.is_empty()) {
                    session.append_assistant_message(text)?;
                }

                for call in &calls {
                    debug!(tool = %call.tool_name, call_id = %call.call_id, "executing tool call");
                    let outcome = gateway.dispatch(&call.tool_name, &call.arguments);
                    let content = if outcome.success {
                        outcome.output
                    } else {
                        let kind = outcome
                            .error_kind
                            .map(|kind| format!("{kind:?}"))
                            .unwrap_or_else(|| "Unknown".to_string());
                        format!("ERROR[{kind}]: {}", outcome.output)
                    };

                    let report = session.append_tool_message(content, &call.call_id)?;
                    if let Some(warning) = report.warning {
                        warnings.push(warning);
                    }
                }

                tool_rounds += 1;
                if tool_rounds >= max_steps {
                    let note = "Stopped: reached the reasoning step limit for this turn.";
                    session.append_assistant_message(note)?;
                    return Ok(TurnSummary {
                        assistant_text: note.to_string(),
                        tool_rounds,
                        step_limit_reached: true,
                        warnings,
                    });
                }
            }
        }
    }
}

/// Maps session history into the provider-neutral wire form, with attached
/// file snapshots rendered as one system block after the system prompt.
pub fn wire_history(session: &Session) -> Vec<WireMessage> {
    let mut wire: Vec<WireMessage> = session
        .history()
        .iter()
        .map(|message| WireMessage {
            role: match message.role {
                Role::System => WireRole::System,
                Role::User => WireRole::User,
                Role::Assistant => WireRole::Assistant,
                Role::Tool => WireRole::Tool,
            },
            content: message.content.clone(),
            tool_call_id: message.tool_call_id.clone(),
        })
        .collect();

    if let Some(block) = session.render_file_context() {
        let at = wire
            .iter()
            .take_while(|message| message.role == WireRole::System)
            .count();
        wire.insert(at, WireMessage::new(WireRole::System, block));
    }

    wire
}
