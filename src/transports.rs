use std::env;

use anyhow::bail;
use model_transport::{
    ModelTransport, ToolDefinition, TransportError, TurnOutput, WireMessage, WireRole,
};

const TRANSPORT_ENV: &str = "ENGINEER_TRANSPORT";

/// Offline transport that acknowledges the latest user message. Deterministic
/// and side-effect free; useful for demos and manual REPL testing.
#[derive(Debug, Default)]
pub struct MockTransport;

impl ModelTransport for MockTransport {
    fn complete(
        &mut self,
        model_id: &str,
        messages: &[WireMessage],
        _tools: &[ToolDefinition],
    ) -> Result<TurnOutput, TransportError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|message| message.role == WireRole::User)
            .map(|message| message.content.as_str())
            .unwrap_or("");

        Ok(TurnOutput::Assistant {
            text: format!(
                "[mock {model_id}] received {} message(s); latest: {last_user}",
                messages.len()
            ),
        })
    }
}

/// Selects a transport from `ENGINEER_TRANSPORT`.
pub fn transport_from_env() -> anyhow::Result<Box<dyn ModelTransport>> {
    match env::var(TRANSPORT_ENV).ok().as_deref() {
        Some("mock") => Ok(Box::new(MockTransport)),
        Some(other) => bail!("unsupported {TRANSPORT_ENV} '{other}'; supported: mock"),
        None => bail!("set {TRANSPORT_ENV}=mock to select a transport"),
    }
}
