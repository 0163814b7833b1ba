use rust_i18n::t;
use serde_json::{Map, Value};
use thiserror::Error;

/// Boxed low-level failure kept as the source of a tool error.
pub type ToolErrorCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A registered tool failed while running.
    ///
    /// `context` always carries the `toolName` key next to the tool-specific inputs.
    #[error("{}", t!("tools.execution_failed", tool_name = .tool_name, message = .message))]
    Execution {
        tool_name: String,
        message: String,
        #[source]
        cause: Option<ToolErrorCause>,
        context: Map<String, Value>,
    },

    /// Arguments did not match the tool's input schema
    #[error("{}", t!("tools.invalid_arguments", tool_name = .tool_name, message = .message))]
    InvalidArguments { tool_name: String, message: String },

    /// Function not found
    #[error("{}", t!("tools.function_not_found", name = _0))]
    FunctionNotFound(String),

    /// Function already exists
    #[error("{}", t!("tools.function_already_exists", name = _0))]
    FunctionAlreadyExists(String),
}

impl ToolError {
    /// Wraps a failure caught at a tool's boundary.
    ///
    /// # Arguments
    /// * `tool_name` - The tool that failed.
    /// * `cause` - The original error; its message becomes the error message.
    /// * `context` - Tool inputs worth reporting. Non-object values are stored under `value`.
    pub fn execution(tool_name: &str, cause: impl Into<ToolErrorCause>, context: Value) -> Self {
        let cause = cause.into();
        let mut context = match context {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_string(), other)]),
        };
        context.insert("toolName".to_string(), Value::String(tool_name.to_string()));

        ToolError::Execution {
            tool_name: tool_name.to_string(),
            message: cause.to_string(),
            cause: Some(cause),
            context,
        }
    }

    /// The tool this error belongs to, when known.
    pub fn tool_name(&self) -> &str {
        match self {
            ToolError::Execution { tool_name, .. } | ToolError::InvalidArguments { tool_name, .. } => {
                tool_name
            }
            ToolError::FunctionNotFound(name) | ToolError::FunctionAlreadyExists(name) => name,
        }
    }

    /// Structured details for the caller; empty for registry errors.
    pub fn context(&self) -> Map<String, Value> {
        match self {
            ToolError::Execution { context, .. } => context.clone(),
            _ => Map::new(),
        }
    }
}
