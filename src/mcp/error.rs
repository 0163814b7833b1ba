use crate::tools::ToolError;
use rmcp::model::ErrorData;
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", content = "details", rename_all = "camelCase")]
pub enum McpError {
    // Server-side errors
    #[error("{}", t!("mcp.error.server_initialization_failed", error = _0))]
    ServerInitializationError(String),
    #[error("{}", t!("mcp.error.server_internal_error", error = _0))]
    ServerInternalError(String),

    // Tool errors as seen by the protocol layer
    #[error("{}", t!("mcp.error.tool_not_found", name = _0))]
    ToolNotFound(String),
    #[error("{}", t!("mcp.error.tool_execution_failed", error = _0))]
    ToolExecutionError(String),
    #[error("{}", t!("mcp.error.invalid_params", error = _0))]
    InvalidParams(String),

    // Resource errors
    #[error("{}", t!("mcp.error.resource_not_found", uri = _0))]
    ResourceNotFound(String),
    #[error("{}", t!("mcp.error.resource_read_failed", name = .name, message = .message))]
    ResourceReadError {
        name: String,
        message: String,
        cause: Option<String>,
        context: Map<String, Value>,
    },
    #[error("{}", t!("mcp.error.resource_already_exists", uri = _0))]
    ResourceAlreadyExists(String),

    // Prompt errors
    #[error("{}", t!("mcp.error.prompt_not_found", name = _0))]
    PromptNotFound(String),
    #[error("{}", t!("mcp.error.prompt_failed", name = .name, message = .message))]
    PromptError {
        name: String,
        message: String,
        cause: Option<String>,
        context: Map<String, Value>,
    },
    #[error("{}", t!("mcp.error.prompt_already_exists", name = _0))]
    PromptAlreadyExists(String),

    // Common errors
    #[error("{}", t!("mcp.error.io_error", error = _0))]
    Io(String),
    #[error("{}", t!("mcp.error.serialization_error", error = _0))]
    Serialization(String),
}

impl McpError {
    /// Builds a prompt failure; `context` is stored as-is when it is an object.
    pub fn prompt(name: &str, message: impl Into<String>, context: Value) -> Self {
        McpError::PromptError {
            name: name.to_string(),
            message: message.into(),
            cause: None,
            context: into_context(context),
        }
    }

    /// Builds a resource failure; `context` is stored as-is when it is an object.
    pub fn resource(
        name: &str,
        message: impl Into<String>,
        cause: Option<String>,
        context: Value,
    ) -> Self {
        McpError::ResourceReadError {
            name: name.to_string(),
            message: message.into(),
            cause,
            context: into_context(context),
        }
    }
}

fn into_context(context: Value) -> Map<String, Value> {
    match context {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl From<McpError> for ErrorData {
    fn from(error: McpError) -> Self {
        let message = error.to_string();
        match error {
            McpError::ToolNotFound(name) => {
                ErrorData::invalid_params(message, Some(json!({ "toolName": name })))
            }
            McpError::InvalidParams(_) => ErrorData::invalid_params(message, None),
            McpError::ResourceNotFound(uri) => {
                ErrorData::resource_not_found(message, Some(json!({ "uri": uri })))
            }
            McpError::PromptNotFound(name) => {
                ErrorData::invalid_params(message, Some(json!({ "prompt": name })))
            }
            McpError::PromptError { context, .. } => {
                ErrorData::invalid_params(message, Some(Value::Object(context)))
            }
            McpError::ResourceReadError { context, .. } => {
                ErrorData::internal_error(message, Some(Value::Object(context)))
            }
            McpError::ServerInitializationError(_)
            | McpError::ServerInternalError(_)
            | McpError::ToolExecutionError(_)
            | McpError::ResourceAlreadyExists(_)
            | McpError::PromptAlreadyExists(_)
            | McpError::Io(_)
            | McpError::Serialization(_) => ErrorData::internal_error(message, None),
        }
    }
}

impl From<ToolError> for McpError {
    fn from(error: ToolError) -> Self {
        match &error {
            ToolError::FunctionNotFound(name) => McpError::ToolNotFound(name.clone()),
            ToolError::InvalidArguments { .. } => McpError::InvalidParams(error.to_string()),
            ToolError::Execution { .. } => McpError::ToolExecutionError(error.to_string()),
            ToolError::FunctionAlreadyExists(_) => {
                McpError::ServerInitializationError(error.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(error: serde_json::Error) -> Self {
        McpError::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(error: std::io::Error) -> Self {
        McpError::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_prompt_error_maps_to_invalid_params_with_context() {
        let error = McpError::prompt("summarize-topic", "Topic must not be empty.", json!({ "topic": "" }));
        let data: ErrorData = error.into();

        assert_eq!(data.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(data.data, Some(json!({ "topic": "" })));
    }

    #[test]
    fn test_resource_not_found_code() {
        let data: ErrorData = McpError::ResourceNotFound("system://nope".to_string()).into();
        assert_eq!(data.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[test]
    fn test_tool_errors_keep_their_kind() {
        let not_found: McpError = ToolError::FunctionNotFound("x".to_string()).into();
        assert_eq!(not_found, McpError::ToolNotFound("x".to_string()));

        let execution: McpError =
            ToolError::execution("greet", "boom", Value::Null).into();
        assert_eq!(
            execution,
            McpError::ToolExecutionError("Error executing tool \"greet\": boom".to_string())
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let value = serde_json::to_value(McpError::PromptNotFound("p".to_string())).unwrap();
        assert_eq!(value["kind"], "promptNotFound");
    }
}
