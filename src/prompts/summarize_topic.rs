use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::mcp::McpError;
use crate::prompts::{PromptArgumentDeclaration, PromptDefinition, PromptRole, PromptTurn, RenderedPrompt};

const PROMPT_NAME: &str = "summarize-topic";

/// Asks the model for a brief summary of a topic.
pub struct SummarizeTopicPrompt;

#[async_trait]
impl PromptDefinition for SummarizeTopicPrompt {
    fn name(&self) -> &str {
        PROMPT_NAME
    }

    fn description(&self) -> &str {
        "Generates a request to summarize a topic."
    }

    fn arguments(&self) -> Vec<PromptArgumentDeclaration> {
        vec![PromptArgumentDeclaration {
            name: "topic".to_string(),
            description: "The topic to summarize.".to_string(),
            required: true,
        }]
    }

    async fn render(&self, arguments: &Map<String, Value>) -> Result<RenderedPrompt, McpError> {
        let topic = match arguments.get("topic") {
            Some(Value::String(topic)) => topic.trim(),
            Some(other) => {
                return Err(McpError::prompt(
                    PROMPT_NAME,
                    "Topic must be a string.",
                    json!({ "topic": other }),
                ))
            }
            None => "",
        };

        if topic.is_empty() {
            log::error!("Rejected {} prompt with an empty topic", PROMPT_NAME);
            return Err(McpError::prompt(
                PROMPT_NAME,
                "Topic must not be empty.",
                json!({ "topic": topic }),
            ));
        }

        log::info!("Generating {} prompt: topic={:?}", PROMPT_NAME, topic);
        Ok(RenderedPrompt {
            description: None,
            messages: vec![PromptTurn {
                role: PromptRole::User,
                text: format!(
                    "Please provide a brief summary of the following topic: {}",
                    topic
                ),
            }],
        })
    }
}
