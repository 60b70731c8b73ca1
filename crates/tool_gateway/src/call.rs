use serde_json::Value;

use crate::error::ToolError;

/// The closed set of tools the gateway executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ReadFile {
        path: String,
    },
    CreateFile {
        path: String,
        content: String,
    },
    EditFile {
        path: String,
        original_snippet: String,
        new_snippet: String,
    },
    RunShell {
        command: String,
    },
}

impl ToolCall {
    /// Validates a raw `(name, arguments)` envelope into a typed call.
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolError> {
        match name {
            "read_file" => Ok(Self::ReadFile {
                path: required_string(name, arguments, "file_path")?,
            }),
            "create_file" => Ok(Self::CreateFile {
                path: required_string(name, arguments, "file_path")?,
                content: required_string(name, arguments, "content")?,
            }),
            "edit_file" => {
                let original_snippet = required_string(name, arguments, "original_snippet")?;
                if original_snippet.is_empty() {
                    return Err(ToolError::invalid_arguments(
                        name,
                        "original_snippet must not be empty",
                    ));
                }

                Ok(Self::EditFile {
                    path: required_string(name, arguments, "file_path")?,
                    original_snippet,
                    new_snippet: required_string(name, arguments, "new_snippet")?,
                })
            }
            "run_shell" => {
                let command = required_string(name, arguments, "command")?;
                if command.trim().is_empty() {
                    return Err(ToolError::invalid_arguments(
                        name,
                        "command must not be empty",
                    ));
                }

                Ok(Self::RunShell { command })
            }
            _ => Err(ToolError::UnknownTool {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "read_file",
            Self::CreateFile { .. } => "create_file",
            Self::EditFile { .. } => "edit_file",
            Self::RunShell { .. } => "run_shell",
        }
    }

    /// Shell execution is the only variant gated behind user confirmation.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::RunShell { .. })
    }
}

fn required_string(tool: &str, arguments: &Value, field: &str) -> Result<String, ToolError> {
    match arguments.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ToolError::invalid_arguments(
            tool,
            format!("field '{field}' must be a string"),
        )),
        None => Err(ToolError::invalid_arguments(
            tool,
            format!("missing required field '{field}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ToolCall;
    use crate::error::{ErrorKind, ToolError};

    #[test]
    fn read_file_parses() {
        let call = ToolCall::parse("read_file", &json!({"file_path": "src/main.rs"})).unwrap();
        assert_eq!(
            call,
            ToolCall::ReadFile {
                path: "src/main.rs".to_string()
            }
        );
        assert!(!call.requires_confirmation());
    }

    #[test]
    fn unknown_tool_is_invalid() {
        let error = ToolCall::parse("delete_everything", &json!({})).unwrap_err();
        assert!(matches!(error, ToolError::UnknownTool { .. }));
        assert_eq!(error.kind(), ErrorKind::InvalidToolCall);
    }

    #[test]
    fn missing_field_is_invalid() {
        let error = ToolCall::parse("create_file", &json!({"file_path": "a.txt"})).unwrap_err();
        assert!(matches!(error, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn wrong_type_is_invalid() {
        let error = ToolCall::parse("read_file", &json!({"file_path": 42})).unwrap_err();
        assert!(matches!(error, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn empty_snippet_is_invalid() {
        let error = ToolCall::parse(
            "edit_file",
            &json!({"file_path": "a.rs", "original_snippet": "", "new_snippet": "x"}),
        )
        .unwrap_err();
        assert!(matches!(error, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn only_shell_requires_confirmation() {
        let shell = ToolCall::parse("run_shell", &json!({"command": "ls"})).unwrap();
        assert!(shell.requires_confirmation());
        assert_eq!(shell.name(), "run_shell");
    }
}
