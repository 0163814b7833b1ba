mod add;
mod error;
mod greet;
mod tool_manager;
mod types;

pub use add::AddTool;
pub use error::ToolError;
pub use greet::GreetTool;
pub use tool_manager::{NativeToolResult, ToolDefinition, ToolManager};
pub use types::{parse_arguments, ToolCallResult, ToolDeclaration};
