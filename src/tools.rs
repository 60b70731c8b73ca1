//! JSON schemas for the built-in tools, advertised through the transport.

use model_transport::ToolDefinition;
use serde_json::json;

pub fn builtin_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "read_file".to_string(),
            description: Some("Read the UTF-8 content of a file inside the project.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Path relative to the project root" }
                },
                "required": ["file_path"]
            }),
        },
        ToolDefinition {
            name: "create_file".to_string(),
            description: Some(
                "Create or overwrite a file with the given content. Parent directories are created as needed.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string" },
                    "content": { "type": "string" }
                },
                "required": ["file_path", "content"]
            }),
        },
        ToolDefinition {
            name: "edit_file".to_string(),
            description: Some(
                "Replace one snippet of a file. The original snippet is located exactly or by close fuzzy match; ambiguous snippets are rejected.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string" },
                    "original_snippet": { "type": "string" },
                    "new_snippet": { "type": "string" }
                },
                "required": ["file_path", "original_snippet", "new_snippet"]
            }),
        },
        ToolDefinition {
            name: "run_shell".to_string(),
            description: Some(
                "Run a shell command in the project root. Requires user confirmation; output and runtime are bounded.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string" }
                },
                "required": ["command"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::builtin_tool_definitions;

    #[test]
    fn definitions_cover_the_closed_tool_set() {
        let names: Vec<_> = builtin_tool_definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(names, vec!["read_file", "create_file", "edit_file", "run_shell"]);
    }

    #[test]
    fn schemas_declare_required_fields() {
        for definition in builtin_tool_definitions() {
            let required = definition.input_schema["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} lacks required fields", definition.name);
        }
    }
}
