use async_trait::async_trait;

use crate::constants::SERVER_NAME;
use crate::mcp::McpError;
use crate::resources::{ResourceContent, ResourceDefinition};

/// Provides a static welcome message.
pub struct WelcomeResource;

#[async_trait]
impl ResourceDefinition for WelcomeResource {
    fn name(&self) -> &str {
        "welcome-message"
    }

    fn uri(&self) -> &str {
        "system://welcome"
    }

    fn description(&self) -> &str {
        "Provides a static welcome message."
    }

    async fn read(&self, uri: &str) -> Result<ResourceContent, McpError> {
        log::info!("Providing static resource: {}", uri);
        Ok(ResourceContent {
            uri: uri.to_string(),
            text: format!("Welcome to the {}!", SERVER_NAME),
        })
    }
}
