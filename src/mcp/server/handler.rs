//! MCP Server Handler
//!
//! Implements the `rmcp` server handler on top of the tool, resource and prompt registries.
//! One handler instance is created per session; all of them share the same `ServerState`.

use crate::constants::SERVER_NAME;
use crate::mcp::McpError;
use crate::prompts::{PromptDeclaration, PromptRole};
use crate::state::ServerState;
use crate::tools::{ToolCallResult, ToolDeclaration, ToolError};
use rmcp::{
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, GetPromptRequestParam,
        GetPromptResult, Implementation, ListPromptsResult, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, Prompt, PromptMessage, PromptMessageRole,
        RawResource, ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
    ErrorData, ServerHandler,
};
use rust_i18n::t;
use serde_json::Value;
use std::sync::Arc;

/// Converts a ToolDeclaration to an rmcp Tool
impl From<ToolDeclaration> for Tool {
    fn from(tool: ToolDeclaration) -> Self {
        let input_schema = match tool.input_schema {
            Value::Object(obj) => Arc::new(obj),
            _ => Arc::new(serde_json::Map::new()),
        };
        Tool::new(tool.name, tool.description, input_schema)
    }
}

impl From<crate::resources::ResourceDeclaration> for Resource {
    fn from(declaration: crate::resources::ResourceDeclaration) -> Self {
        let mut raw = RawResource::new(declaration.uri, declaration.name);
        raw.description = Some(declaration.description);
        raw.mime_type = Some(declaration.mime_type);
        raw.no_annotation()
    }
}

impl TryFrom<PromptDeclaration> for Prompt {
    type Error = McpError;

    fn try_from(declaration: PromptDeclaration) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(serde_json::to_value(declaration)?)?)
    }
}

impl From<PromptRole> for PromptMessageRole {
    fn from(role: PromptRole) -> Self {
        match role {
            PromptRole::User => PromptMessageRole::User,
            PromptRole::Assistant => PromptMessageRole::Assistant,
        }
    }
}

/// MCP Boilerplate Handler
///
/// Answers list/call/read/get requests from the shared registries.
#[derive(Clone)]
pub struct BoilerplateHandler {
    state: Arc<ServerState>,
}

impl BoilerplateHandler {
    /// Creates a new handler bound to the shared server state
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }
}

impl ServerHandler for BoilerplateHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(t!("mcp.server.instructions").to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools: Vec<Tool> = self
            .state
            .tool_manager
            .get_tool_calling_spec()
            .await
            .into_iter()
            .map(Tool::from)
            .collect();

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);

        match self
            .state
            .tool_manager
            .tool_call(&request.name, arguments)
            .await
        {
            Ok(result) => Ok(result.into()),
            // Execution failures are reported to the caller as a tool result, not a protocol error
            Err(err @ ToolError::Execution { .. }) => Ok(ToolCallResult::error(&err).into()),
            Err(err) => {
                log::warn!("Rejected call to tool {}: {}", err.tool_name(), err);
                Err(McpError::from(err).into())
            }
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self
            .state
            .resource_manager
            .list()
            .await
            .into_iter()
            .map(Resource::from)
            .collect();

        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let content = self
            .state
            .resource_manager
            .read(&request.uri)
            .await
            .map_err(|err| {
                log::error!("Error reading resource {}: {}", request.uri, err);
                ErrorData::from(err)
            })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(content.text, content.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        let prompts = self
            .state
            .prompt_manager
            .list()
            .await
            .into_iter()
            .map(Prompt::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListPromptsResult {
            prompts,
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        let rendered = self
            .state
            .prompt_manager
            .get(&request.name, &arguments)
            .await
            .map_err(|err| {
                log::error!("Error generating prompt {}: {}", request.name, err);
                ErrorData::from(err)
            })?;

        Ok(GetPromptResult {
            description: rendered.description,
            messages: rendered
                .messages
                .into_iter()
                .map(|turn| PromptMessage::new_text(turn.role.into(), turn.text))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::prompts::PromptManager;

    #[test]
    fn test_tool_declaration_conversion() {
        let declaration = ToolDeclaration {
            name: "add".to_string(),
            description: "Adds two numbers together.".to_string(),
            input_schema: serde_json::json!({ "type": "object" }),
        };
        let tool: Tool = declaration.into();

        assert_eq!(tool.name, "add");
        assert_eq!(tool.input_schema.get("type"), Some(&serde_json::json!("object")));
    }

    #[tokio::test]
    async fn test_prompt_declaration_conversion() {
        let manager = PromptManager::new();
        manager.register_available_prompts().await.unwrap();
        let prompt = Prompt::try_from(manager.list().await.remove(0)).unwrap();

        assert_eq!(prompt.name, "summarize-topic");
        let arguments = prompt.arguments.unwrap();
        assert_eq!(arguments[0].name, "topic");
        assert_eq!(arguments[0].required, Some(true));
    }

    #[tokio::test]
    async fn test_server_info_advertises_all_capabilities() {
        let state = ServerState::new(Arc::new(Config::default())).await.unwrap();
        let info = BoilerplateHandler::new(Arc::new(state)).get_info();

        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
    }
}
