//! MCP Server Module
//!
//! This module implements the MCP server over two transports: a single stdio session, or
//! an HTTP/SSE endpoint that holds one protocol session per connected client.

mod connection_monitor;
mod handler;
mod session;
mod standalone;

pub use session::SessionManager;
pub use standalone::{create_sse_router, serve_stdio};
