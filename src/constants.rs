use std::time::Duration;

// =================================================
// Environment keys
// =================================================
pub const ENV_TRANSPORT: &str = "MCP_TRANSPORT";
pub const ENV_PORT: &str = "MCP_PORT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_GREETING_PREFIX: &str = "CUSTOM_GREETING_PREFIX";
pub const ENV_LOG_FILE: &str = "LOG_FILE";
// Read from the working directory before the process environment
pub const ENV_FILE: &str = ".env";

// =================================================
// Configuration defaults
// =================================================
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_GREETING: &str = "Hello";

// =================================================
// Server identity
// =================================================
pub const SERVER_NAME: &str = "MCP Boilerplate Server";

// =================================================
// HTTP/SSE transport
// =================================================
pub const SSE_PATH: &str = "/sse";
pub const MESSAGE_PATH: &str = "/messages";
pub const SSE_KEEP_ALIVE: Duration = Duration::from_secs(30);
// Per-direction buffer between a session's HTTP side and its MCP service
pub const SESSION_CHANNEL_CAPACITY: usize = 64;
