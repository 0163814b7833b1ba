//! Static resources exposed to MCP clients.

mod welcome;

pub use welcome::WelcomeResource;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::mcp::McpError;

/// Declaration of a resource as listed to MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDeclaration {
    pub name: String,
    pub uri: String,
    pub description: String,
    pub mime_type: String,
}

/// Text returned when a resource is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceContent {
    pub uri: String,
    pub text: String,
}

#[async_trait]
pub trait ResourceDefinition: Send + Sync {
    fn name(&self) -> &str;

    /// The URI the resource is addressed by.
    fn uri(&self) -> &str;

    fn description(&self) -> &str;

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    fn declaration(&self) -> ResourceDeclaration {
        ResourceDeclaration {
            name: self.name().to_string(),
            uri: self.uri().to_string(),
            description: self.description().to_string(),
            mime_type: self.mime_type().to_string(),
        }
    }

    async fn read(&self, uri: &str) -> Result<ResourceContent, McpError>;
}

/// Registry of resources keyed by URI.
#[derive(Default)]
pub struct ResourceManager {
    resources: RwLock<BTreeMap<String, Arc<dyn ResourceDefinition>>>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the built-in resources.
    pub async fn register_available_resources(&self) -> Result<(), McpError> {
        self.register_resource(Arc::new(WelcomeResource)).await
    }

    pub async fn register_resource(
        &self,
        resource: Arc<dyn ResourceDefinition>,
    ) -> Result<(), McpError> {
        let mut resources = self.resources.write().await;
        let uri = resource.uri().to_string();
        if resources.contains_key(&uri) {
            return Err(McpError::ResourceAlreadyExists(uri));
        }
        log::debug!("Registered resource: {} ({})", resource.name(), uri);
        resources.insert(uri, resource);
        Ok(())
    }

    /// Declarations of all resources, ordered by URI.
    pub async fn list(&self) -> Vec<ResourceDeclaration> {
        self.resources
            .read()
            .await
            .values()
            .map(|resource| resource.declaration())
            .collect()
    }

    pub async fn read(&self, uri: &str) -> Result<ResourceContent, McpError> {
        let resource = self
            .resources
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        resource.read(uri).await.map_err(|err| match err {
            McpError::ResourceReadError { .. } | McpError::ResourceNotFound(_) => err,
            other => McpError::resource(
                resource.name(),
                other.to_string(),
                Some(format!("{:?}", other)),
                serde_json::json!({ "uri": uri }),
            ),
        })
    }
}
