use rmcp::model::{JsonObject, ListToolsResult, Tool};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct ToolService;

/// Turn a `json!` object literal into a tool input schema.
fn schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

impl ToolService {
    pub fn list_tools() -> ListToolsResult {
        ListToolsResult {
            tools: vec![
                Tool::new(
                    "write_file",
                    "Create or fully overwrite a widget file. Prefer replace_lines for small edits to existing files.",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "filePath": { "type": "string", "description": "Root-anchored path such as /src/App.tsx" },
                            "content": { "type": "string", "description": "Complete new file content" }
                        },
                        "required": ["widgetId", "filePath", "content"]
                    })),
                ),
                Tool::new(
                    "view_file",
                    "Show a widget file with 1-indexed line numbers (\"42|code\"). Without `lines` the first 500 lines are shown.",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "filePath": { "type": "string" },
                            "lines": { "type": "string", "description": "Comma-separated inclusive ranges, e.g. \"1-50, 120, 200-210\"" }
                        },
                        "required": ["widgetId", "filePath"]
                    })),
                ),
                Tool::new(
                    "delete_file",
                    "Delete a widget file and, by default, its search index entry.",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "filePath": { "type": "string" },
                            "removeFromIndex": { "type": "boolean", "default": true }
                        },
                        "required": ["widgetId", "filePath"]
                    })),
                ),
                Tool::new(
                    "search_files",
                    "Regex search across widget files with surrounding context lines.",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "query": { "type": "string", "description": "Regular expression" },
                            "includePattern": { "type": "string", "default": "**/*", "description": "Glob for files to scan" },
                            "excludePattern": { "type": "string", "description": "Glob for files to skip; replaces the default excludes" },
                            "caseSensitive": { "type": "boolean", "default": false },
                            "contextLines": { "type": "integer", "minimum": 0, "default": 2 }
                        },
                        "required": ["widgetId", "query"]
                    })),
                ),
                Tool::new(
                    "search",
                    "Find code by meaning (semantic), by content regex (exact) or by path (filename).",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "query": { "type": "string" },
                            "searchType": { "type": "string", "enum": ["semantic", "exact", "filename"], "default": "semantic" },
                            "limit": { "type": "integer", "minimum": 1, "default": 10 }
                        },
                        "required": ["widgetId", "query"]
                    })),
                ),
                Tool::new(
                    "replace_lines",
                    "Replace an inclusive line range. `search` must match the current content of the range; `...` stands for elided lines. Nothing is written on mismatch.",
                    schema(json!({
                        "type": "object",
                        "properties": {
                            "widgetId": { "type": "string" },
                            "filePath": { "type": "string" },
                            "search": { "type": "string", "description": "Current text of the range, `...` for elided sections" },
                            "firstReplacedLine": { "type": "integer", "minimum": 1 },
                            "lastReplacedLine": { "type": "integer", "minimum": 1 },
                            "replace": { "type": "string", "description": "New text for the range; empty leaves one blank line" }
                        },
                        "required": ["widgetId", "filePath", "search", "firstReplacedLine", "lastReplacedLine", "replace"]
                    })),
                ),
            ],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operation_is_listed() {
        let names: Vec<String> = ToolService::list_tools()
            .tools
            .iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "write_file",
                "view_file",
                "delete_file",
                "search_files",
                "search",
                "replace_lines"
            ]
        );
    }

    #[test]
    fn test_schemas_use_camel_case_fields() {
        let result = ToolService::list_tools();
        let replace = result
            .tools
            .iter()
            .find(|t| t.name == "replace_lines")
            .unwrap();
        let properties = replace.input_schema.get("properties").unwrap();
        assert!(properties.get("firstReplacedLine").is_some());
        assert!(properties.get("first_replaced_line").is_none());
    }
}
