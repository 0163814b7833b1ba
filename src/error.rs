use thiserror::Error;

/// The single, unified error type for the entire application.
///
/// Wraps every module-specific error so that startup and the transports can propagate
/// failures with `?` and report them in one place.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Logger(#[from] crate::logger::LoggerError),

    #[error(transparent)]
    Tool(#[from] crate::tools::ToolError),

    #[error(transparent)]
    Mcp(#[from] crate::mcp::McpError),

    /// Errors originating from the HTTP module.
    #[error(transparent)]
    Http(#[from] crate::http::error::HttpError),
}

/// A universal Result type for fallible application functions.
pub type Result<T> = std::result::Result<T, AppError>;
