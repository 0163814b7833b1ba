use rmcp::model::{CallToolResult, Content};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tools::ToolError;

/// Declaration of a tool as advertised to MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's arguments object.
    pub input_schema: Value,
}

/// A single content item returned by a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    pub is_error: bool,
}

impl ToolCallResult {
    /// A successful result carrying one text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            structured_content: None,
            is_error: false,
        }
    }

    /// A failed result that reports the error to the calling client.
    pub fn error(error: &ToolError) -> Self {
        let message = error.to_string();
        Self {
            content: vec![ToolContent::Text {
                text: message.clone(),
            }],
            structured_content: Some(json!({
                "error": message,
                "context": error.context(),
            })),
            is_error: true,
        }
    }

    /// Concatenated text of all text items.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|item| match item {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ToolCallResult> for CallToolResult {
    fn from(value: ToolCallResult) -> Self {
        let content = value
            .content
            .into_iter()
            .map(|item| match item {
                ToolContent::Text { text } => Content::text(text),
            })
            .collect();

        let mut result = if value.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        };
        result.structured_content = value.structured_content;
        result
    }
}

/// Deserializes a tool's arguments into its typed input.
///
/// A missing arguments object is treated as `{}` so that tools with only optional
/// fields can be called without arguments.
pub fn parse_arguments<T: DeserializeOwned>(tool_name: &str, params: Value) -> Result<T, ToolError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| ToolError::InvalidArguments {
        tool_name: tool_name.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_serializes_as_tagged_union() {
        let result = ToolCallResult::text("Hello, World!");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({
                "content": [{ "type": "text", "text": "Hello, World!" }],
                "isError": false
            })
        );
    }

    #[test]
    fn test_error_result_converts_to_mcp_error_result() {
        let err = ToolError::execution("add", "too large", json!({ "a": 1 }));
        let result: CallToolResult = ToolCallResult::error(&err).into();

        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["context"]["toolName"], "add");
    }

    #[test]
    fn test_parse_arguments_reports_tool_name() {
        #[derive(Debug, Deserialize)]
        struct Args {
            #[allow(dead_code)]
            a: f64,
        }

        let err = parse_arguments::<Args>("add", json!({ "a": "x" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref tool_name, .. } if tool_name == "add"));
    }
}
