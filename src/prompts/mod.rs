//! Prompt templates exposed to MCP clients.

mod summarize_topic;

pub use summarize_topic::SummarizeTopicPrompt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::mcp::McpError;

/// One argument accepted by a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptArgumentDeclaration {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Declaration of a prompt as listed to MCP clients.
///
/// Serializes to the MCP `Prompt` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptDeclaration {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgumentDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTurn {
    pub role: PromptRole,
    pub text: String,
}

/// The messages produced by rendering a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub description: Option<String>,
    pub messages: Vec<PromptTurn>,
}

#[async_trait]
pub trait PromptDefinition: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn arguments(&self) -> Vec<PromptArgumentDeclaration>;

    fn declaration(&self) -> PromptDeclaration {
        PromptDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            arguments: self.arguments(),
        }
    }

    async fn render(&self, arguments: &Map<String, Value>) -> Result<RenderedPrompt, McpError>;
}

/// Registry of prompts keyed by name.
#[derive(Default)]
pub struct PromptManager {
    prompts: RwLock<BTreeMap<String, Arc<dyn PromptDefinition>>>,
}

impl PromptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the built-in prompts.
    pub async fn register_available_prompts(&self) -> Result<(), McpError> {
        self.register_prompt(Arc::new(SummarizeTopicPrompt)).await
    }

    pub async fn register_prompt(&self, prompt: Arc<dyn PromptDefinition>) -> Result<(), McpError> {
        let mut prompts = self.prompts.write().await;
        let name = prompt.name().to_string();
        if prompts.contains_key(&name) {
            return Err(McpError::PromptAlreadyExists(name));
        }
        log::debug!("Registered prompt: {}", name);
        prompts.insert(name, prompt);
        Ok(())
    }

    /// Declarations of all prompts, ordered by name.
    pub async fn list(&self) -> Vec<PromptDeclaration> {
        self.prompts
            .read()
            .await
            .values()
            .map(|prompt| prompt.declaration())
            .collect()
    }

    /// Renders a prompt after checking that every required argument is present.
    pub async fn get(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<RenderedPrompt, McpError> {
        let prompt = self
            .prompts
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| McpError::PromptNotFound(name.to_string()))?;

        if let Some(missing) = prompt
            .arguments()
            .iter()
            .find(|arg| arg.required && !arguments.contains_key(&arg.name))
        {
            return Err(McpError::prompt(
                name,
                format!("Missing required argument: {}", missing.name),
                Value::Object(arguments.clone()),
            ));
        }

        prompt.render(arguments).await
    }
}
