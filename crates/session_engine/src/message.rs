use serde::{Deserialize, Serialize};

use crate::tokens;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation history entry.
///
/// The token estimate is fixed when the message is created; messages are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub estimated_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let estimated_tokens = tokens::estimate(&content);
        Self {
            role,
            content,
            estimated_tokens,
            tool_call_id: None,
        }
    }

    /// Builds a tool-result message tied to the originating call.
    #[must_use]
    pub fn tool(content: impl Into<String>, call_id: impl Into<String>) -> Self {
        let mut message = Self::new(Role::Tool, content);
        message.tool_call_id = Some(call_id.into());
        message
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Role};

    #[test]
    fn estimate_is_fixed_at_creation() {
        let message = Message::new(Role::User, "abcdefgh");
        assert_eq!(message.estimated_tokens, 2);
    }

    #[test]
    fn tool_messages_carry_the_call_id() {
        let message = Message::tool("ok", "call-7");
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call-7"));
    }

    #[test]
    fn roles_serialize_snake_case() {
        let message = Message::new(Role::Assistant, "hi");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("tool_call_id").is_none());
    }
}
