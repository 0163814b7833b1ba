use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::tools::error::ToolError;
use crate::tools::{AddTool, GreetTool, ToolCallResult, ToolDeclaration};

/// The result type of a tool call.
pub type NativeToolResult = Result<ToolCallResult, ToolError>;

/// A trait defining the characteristics of a tool.
#[async_trait]
pub trait ToolDefinition: Send + Sync {
    /// Gets the name of the tool.
    fn name(&self) -> &str;

    /// Gets the description of the tool.
    fn description(&self) -> &str;

    /// JSON Schema describing the arguments object.
    fn input_schema(&self) -> Value;

    /// Returns the declaration advertised to MCP clients.
    fn tool_calling_spec(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Executes the tool.
    ///
    /// # Arguments
    /// * `params` - The arguments object sent by the client.
    ///
    /// # Returns
    /// * `NativeToolResult` - The content payload, or a typed error.
    async fn call(&self, params: Value) -> NativeToolResult;
}

/// Manages the registration and execution of tools.
pub struct ToolManager {
    /// A map of registered tools keyed by name.
    tools: RwLock<HashMap<String, Arc<dyn ToolDefinition>>>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    /// Creates an empty `ToolManager`.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Registers the built-in tools.
    ///
    /// # Arguments
    /// * `config` - Supplies the greeting prefix.
    pub async fn register_available_tools(&self, config: &Config) -> Result<(), ToolError> {
        self.register_tool(Arc::new(GreetTool::new(config.greeting_prefix.clone())))
            .await?;
        self.register_tool(Arc::new(AddTool::new())).await?;
        Ok(())
    }

    /// Registers a tool. Names are unique.
    pub async fn register_tool(&self, tool: Arc<dyn ToolDefinition>) -> Result<(), ToolError> {
        let mut tools = self.tools.write().await;
        let name = tool.name().to_string();
        if tools.contains_key(&name) {
            return Err(ToolError::FunctionAlreadyExists(name));
        }
        log::debug!("Registered tool: {}", name);
        tools.insert(name, tool);
        Ok(())
    }

    /// Returns the declarations of all registered tools, sorted by name.
    pub async fn get_tool_calling_spec(&self) -> Vec<ToolDeclaration> {
        let tools = self.tools.read().await;
        let mut specs: Vec<ToolDeclaration> =
            tools.values().map(|tool| tool.tool_calling_spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Invokes a registered tool.
    ///
    /// # Arguments
    /// * `name` - The tool name.
    /// * `params` - The arguments object.
    pub async fn tool_call(&self, name: &str, params: Value) -> NativeToolResult {
        let tool = self
            .tools
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::FunctionNotFound(name.to_string()))?;

        log::debug!("Calling tool {} with arguments: {}", name, params);
        tool.call(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn manager() -> ToolManager {
        let manager = ToolManager::new();
        manager
            .register_available_tools(&Config::default())
            .await
            .unwrap();
        manager
    }

    #[tokio::test]
    async fn test_builtin_tools_are_registered_sorted() {
        let manager = manager().await;
        let names: Vec<String> = manager
            .get_tool_calling_spec()
            .await
            .into_iter()
            .map(|spec| spec.name)
            .collect();

        assert_eq!(names, vec!["add", "greet"]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let manager = manager().await;
        let result = manager.register_tool(Arc::new(AddTool::new())).await;

        assert!(matches!(result, Err(ToolError::FunctionAlreadyExists(name)) if name == "add"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let manager = manager().await;
        let result = manager.tool_call("multiply", json!({})).await;

        assert!(matches!(result, Err(ToolError::FunctionNotFound(name)) if name == "multiply"));
    }

    #[tokio::test]
    async fn test_dispatches_by_name() {
        let manager = manager().await;
        let result = manager
            .tool_call("add", json!({ "a": 3, "b": 4 }))
            .await
            .unwrap();

        assert_eq!(result.text_content(), "The sum of 3 and 4 is 7.");
    }
}
