use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

/// HTTP module error types
#[derive(Error, Debug, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum HttpError {
    /// IO error while serving
    #[error("{}", t!("http.io_error", error = _0))]
    Io(String),
    /// The listener could not be bound
    #[error("{}", t!("http.server_startup_failed", error = _0))]
    StartUp(String),
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Io(err.to_string())
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
