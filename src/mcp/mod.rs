pub mod error;
pub mod server;

pub use error::McpError;
