use std::io::IsTerminal;

use rust_i18n::t;
use thiserror::Error;

use crate::config::Config;

const CRATE_TARGET: &str = "mcp_boilerplate";

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("{}", t!("logger.log_file_failed", path = .path, error = .source))]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", t!("logger.already_initialized", error = _0))]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Simplifies file paths by extracting relevant parts from cargo registry paths
///
/// # Arguments
/// * `file_path` - The file path to simplify
///
/// # Returns
/// A simplified version of the file path
fn simplify_file_path(file_path: &str) -> String {
    if let Some(pos) = file_path.rfind("/src/") {
        if !file_path.contains(".cargo/registry/src/") {
            return file_path[(pos + 1)..].to_string();
        }
    }

    if let Some((_, suffix)) = file_path.split_once(".cargo/registry/src/") {
        if let Some(first_slash) = suffix.find('/') {
            suffix[(first_slash + 1)..].to_string()
        } else {
            suffix.to_string()
        }
    } else {
        file_path.to_string()
    }
}

/// Formats log messages for the console with a compact, colored layout.
///
/// Colors are only emitted when stderr is a terminal, so MCP clients that capture the
/// server's stderr receive plain text.
pub fn console_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    let level = record.level();
    let (level_color, reset) = if std::io::stderr().is_terminal() {
        let color = match level {
            log::Level::Error => "\x1B[31m", // red
            log::Level::Warn => "\x1B[33m",  // yellow
            log::Level::Info => "\x1B[32m",  // green
            log::Level::Debug => "\x1B[0m",  // normal
            log::Level::Trace => "\x1B[35m", // purple
        };
        (color, "\x1B[0m")
    } else {
        ("", "")
    };

    out.finish(format_args!(
        "{}{}[{}] {}:{} {}{}",
        level_color,
        chrono::Local::now().format("%H:%M:%S.%3f "),
        get_level(level),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message,
        reset,
    ))
}

/// Formats log messages for file output with a full timestamp.
pub fn file_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    out.finish(format_args!(
        "{}[{}] {}:{} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        get_level(record.level()),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message
    ))
}

/// Sets up the process-wide logger.
///
/// Console output always goes to stderr: in stdio mode stdout carries protocol frames and
/// must never see a log line. Records from dependencies are kept only at `info` and above.
///
/// # Arguments
/// * `config` - Supplies the level filter and the optional log file.
pub fn setup_logger(config: &Config) -> Result<(), LoggerError> {
    let mut dispatcher = fern::Dispatch::new()
        .level(config.log_level)
        .filter(|metadata| {
            metadata.target().starts_with(CRATE_TARGET)
                || metadata.level() < log::LevelFilter::Debug
        })
        .chain(
            fern::Dispatch::new()
                .format(console_log_formatter)
                .chain(std::io::stderr()),
        );

    if let Some(path) = &config.log_file {
        let file = fern::log_file(path).map_err(|source| LoggerError::LogFile {
            path: path.display().to_string(),
            source,
        })?;
        dispatcher = dispatcher.chain(
            fern::Dispatch::new()
                .format(file_log_formatter)
                .chain(file),
        );
    }

    dispatcher.apply()?;

    log::debug!("Logger initialized at level {}", config.log_level);
    Ok(())
}

fn get_level(level: log::Level) -> String {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    }
    .to_string()
}

#[cfg(test)]
use log::SetLoggerError;

/// Sets up a console-only logger for tests.
#[cfg(test)]
pub fn setup_test_logger() -> Result<(), SetLoggerError> {
    if log::logger().enabled(&log::Metadata::builder().level(log::Level::Debug).build()) {
        return Ok(()); // already initialized
    }

    fern::Dispatch::new()
        .format(console_log_formatter)
        .level(log::LevelFilter::Debug)
        .filter(|metadata| {
            metadata.target().starts_with(CRATE_TARGET)
                || metadata.level() < log::LevelFilter::Debug
        })
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| {
            log::error!("Failed to initialize logger: {:?}", e);
            e
        })?;

    log::debug!("Test logger initialized successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_project_path() {
        assert_eq!(
            simplify_file_path("/home/dev/mcp-boilerplate/src/mcp/server/session.rs"),
            "src/mcp/server/session.rs"
        );
    }

    #[test]
    fn test_simplify_registry_path() {
        assert_eq!(
            simplify_file_path(
                "/home/dev/.cargo/registry/src/index.crates.io-6f17d22bba15001f/rmcp-0.8.5/src/service.rs"
            ),
            "rmcp-0.8.5/src/service.rs"
        );
    }

    #[test]
    fn test_log_file_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            // a directory cannot be opened as a log file
            log_file: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let result = setup_logger(&config);
        assert!(matches!(result, Err(LoggerError::LogFile { .. })));
    }
}
