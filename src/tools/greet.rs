use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::constants::DEFAULT_GREETING;
use crate::tools::{parse_arguments, NativeToolResult, ToolCallResult, ToolDefinition, ToolError};

const TOOL_NAME: &str = "greet";
/// Names equal to this (case-insensitively) make the tool fail, to exercise the error path.
const SIMULATED_ERROR_NAME: &str = "error";
pub const SIMULATED_ERROR_MESSAGE: &str = "Simulated error during greeting.";

#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
    #[serde(default)]
    greeting: Option<String>,
}

/// Greets someone by name, optionally with a configured prefix.
pub struct GreetTool {
    prefix: String,
}

impl GreetTool {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn compose(&self, name: &str, greeting: &str) -> anyhow::Result<String> {
        if name.to_lowercase() == SIMULATED_ERROR_NAME {
            anyhow::bail!(SIMULATED_ERROR_MESSAGE);
        }
        Ok(format!("{}{}, {}!", self.prefix, greeting, name))
    }
}

#[async_trait]
impl ToolDefinition for GreetTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Greets a person by name with an optional greeting phrase."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name of the person to greet."
                },
                "greeting": {
                    "type": "string",
                    "description": "The greeting phrase to use (optional).",
                    "default": DEFAULT_GREETING
                }
            },
            "required": ["name"]
        })
    }

    async fn call(&self, params: Value) -> NativeToolResult {
        let args: GreetArgs = parse_arguments(TOOL_NAME, params)?;
        let greeting = args.greeting.as_deref().unwrap_or(DEFAULT_GREETING);

        log::info!(
            "Executing {} tool: name={:?}, greeting={:?}",
            TOOL_NAME,
            args.name,
            greeting
        );

        match self.compose(&args.name, greeting) {
            Ok(message) => Ok(ToolCallResult::text(message)),
            Err(err) => {
                log::error!(
                    "Error executing {} tool: {}, name={:?}, greeting={:?}",
                    TOOL_NAME,
                    err,
                    args.name,
                    greeting
                );
                Err(ToolError::execution(
                    TOOL_NAME,
                    err,
                    json!({ "name": args.name, "greeting": greeting }),
                ))
            }
        }
    }
}
