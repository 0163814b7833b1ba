use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::tools::{parse_arguments, NativeToolResult, ToolCallResult, ToolDefinition, ToolError};

const TOOL_NAME: &str = "add";
/// Largest magnitude accepted for either operand.
const MAX_OPERAND: f64 = 1e15;

#[derive(Debug, Deserialize)]
struct AddArgs {
    a: f64,
    b: f64,
}

/// Adds two numbers.
pub struct AddTool;

impl AddTool {
    pub fn new() -> Self {
        Self
    }

    fn sum(a: f64, b: f64) -> anyhow::Result<f64> {
        if a.abs() > MAX_OPERAND || b.abs() > MAX_OPERAND {
            anyhow::bail!("Input values are too large to add safely (limit is 1e15).");
        }
        Ok(a + b)
    }
}

impl Default for AddTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolDefinition for AddTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Adds two numbers together."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "The first number." },
                "b": { "type": "number", "description": "The second number." }
            },
            "required": ["a", "b"]
        })
    }

    async fn call(&self, params: Value) -> NativeToolResult {
        let AddArgs { a, b } = parse_arguments(TOOL_NAME, params)?;
        log::info!("Executing {} tool: a={}, b={}", TOOL_NAME, a, b);

        match Self::sum(a, b) {
            Ok(sum) => Ok(ToolCallResult::text(format!(
                "The sum of {} and {} is {}.",
                a, b, sum
            ))),
            Err(err) => {
                log::error!("Error executing {} tool: {}, a={}, b={}", TOOL_NAME, err, a, b);
                Err(ToolError::execution(TOOL_NAME, err, json!({ "a": a, "b": b })))
            }
        }
    }
}
