use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::prompts::PromptManager;
use crate::resources::ResourceManager;
use crate::tools::ToolManager;

/// Everything a protocol session needs, built once at startup and shared read-only.
pub struct ServerState {
    pub config: Arc<Config>,
    pub tool_manager: ToolManager,
    pub resource_manager: ResourceManager,
    pub prompt_manager: PromptManager,
}

impl ServerState {
    /// Creates the state and registers every built-in tool, resource and prompt.
    pub async fn new(config: Arc<Config>) -> Result<Self> {
        let tool_manager = ToolManager::new();
        tool_manager.register_available_tools(&config).await?;

        let resource_manager = ResourceManager::new();
        resource_manager.register_available_resources().await?;

        let prompt_manager = PromptManager::new();
        prompt_manager.register_available_prompts().await?;

        Ok(Self {
            config,
            tool_manager,
            resource_manager,
            prompt_manager,
        })
    }
}
