use mcp_boilerplate_lib::error::AppError;

/// The entry point of the application.
/// Runs the server and turns its outcome into the process exit status.
#[tokio::main]
async fn main() {
    let code = match mcp_boilerplate_lib::run().await {
        Ok(()) => 0,
        // Without a logger the failure can only go straight to stderr
        Err(e @ AppError::Logger(_)) => {
            eprintln!("Failed to start MCP server: {}", e);
            1
        }
        Err(e) => {
            log::error!("Failed to start MCP server: {}", e);
            1
        }
    };
    // stdin reads run on a blocking thread that would otherwise hold the runtime open
    std::process::exit(code);
}
