//! Process configuration.
//!
//! Settings are read once from an environment-style key/value source and frozen into an
//! immutable [`Config`]. Loading never fails: every malformed value degrades to its default
//! and produces a [`ConfigWarning`], which the caller logs once the logger is up (the log
//! level itself is part of the configuration, so warnings cannot be logged while loading).

use std::fmt::Display;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use rust_i18n::t;
use thiserror::Error;

use crate::constants::{
    DEFAULT_PORT, ENV_FILE, ENV_GREETING_PREFIX, ENV_LOG_FILE, ENV_LOG_LEVEL, ENV_PORT, ENV_TRANSPORT,
};

/// Which transport serves the MCP protocol for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// A single implicit session over stdin/stdout.
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events, one session per connected client.
    Http,
}

impl Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Stdio => write!(f, "stdio"),
            TransportMode::Http => write!(f, "http"),
        }
    }
}

/// A recoverable configuration problem. The default has already been applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("{}", t!("config.invalid_transport", value = _0))]
    InvalidTransport(String),
    #[error("{}", t!("config.invalid_port", value = _0, default = DEFAULT_PORT))]
    InvalidPort(String),
    #[error("{}", t!("config.invalid_log_level", value = _0))]
    InvalidLogLevel(String),
    #[error("{}", t!("config.invalid_env_file", path = .path, error = .error))]
    InvalidEnvFile { path: String, error: String },
}

/// Immutable, validated configuration shared by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub transport: TransportMode,
    pub port: u16,
    pub log_level: LevelFilter,
    /// Prepended verbatim to every greeting; empty by default.
    pub greeting_prefix: String,
    /// When set, log records are also appended to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportMode::default(),
            port: DEFAULT_PORT,
            log_level: LevelFilter::Info,
            greeting_prefix: String::new(),
            log_file: None,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "transport={} port={} log_level={} greeting_prefix={:?}",
            self.transport,
            self.port,
            self.log_level.as_str().to_lowercase(),
            self.greeting_prefix
        )?;
        if let Some(path) = &self.log_file {
            write!(f, " log_file={}", path.display())?;
        }
        Ok(())
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is applied first; variables already set in
    /// the environment take precedence over it.
    pub fn from_env() -> (Self, Vec<ConfigWarning>) {
        let env_file_warning = load_env_file(Path::new(ENV_FILE)).err();
        let (config, mut warnings) = Self::load(|key| std::env::var(key).ok());
        warnings.extend(env_file_warning);
        (config, warnings)
    }

    /// Loads the configuration from an arbitrary key/value source.
    ///
    /// Empty values are treated the same as unset ones.
    ///
    /// # Arguments
    /// * `lookup` - Returns the raw value for a key, if any.
    ///
    /// # Returns
    /// The configuration together with every warning raised while validating it.
    pub fn load<F>(lookup: F) -> (Self, Vec<ConfigWarning>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut warnings = Vec::new();

        let transport = match get(ENV_TRANSPORT) {
            None => TransportMode::default(),
            Some(raw) => parse_transport(&raw).unwrap_or_else(|| {
                warnings.push(ConfigWarning::InvalidTransport(raw.to_lowercase()));
                TransportMode::default()
            }),
        };

        let port = match get(ENV_PORT) {
            None => DEFAULT_PORT,
            Some(raw) => parse_port(&raw).unwrap_or_else(|| {
                warnings.push(ConfigWarning::InvalidPort(raw));
                DEFAULT_PORT
            }),
        };

        let log_level = match get(ENV_LOG_LEVEL) {
            None => LevelFilter::Info,
            Some(raw) => parse_log_level(&raw).unwrap_or_else(|| {
                warnings.push(ConfigWarning::InvalidLogLevel(raw));
                LevelFilter::Info
            }),
        };

        let config = Self {
            transport,
            port,
            log_level,
            greeting_prefix: lookup(ENV_GREETING_PREFIX).unwrap_or_default(),
            log_file: get(ENV_LOG_FILE).map(PathBuf::from),
        };

        (config, warnings)
    }

    /// Returns a copy that serves over stdio regardless of the configured transport.
    pub fn with_forced_stdio(self) -> Self {
        Self {
            transport: TransportMode::Stdio,
            ..self
        }
    }
}

/// Applies a dotenv file to the process environment without overriding existing variables.
///
/// # Returns
/// `Ok(false)` when the file does not exist, `Ok(true)` once it has been applied.
fn load_env_file(path: &Path) -> Result<bool, ConfigWarning> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(ConfigWarning::InvalidEnvFile {
            path: path.display().to_string(),
            error: e.to_string(),
        }),
    }
}

fn parse_transport(raw: &str) -> Option<TransportMode> {
    match raw.trim().to_lowercase().as_str() {
        "stdio" => Some(TransportMode::Stdio),
        "http" => Some(TransportMode::Http),
        _ => None,
    }
}

/// Accepts decimal integers in `1..=65535`; zero, negatives and overflow are rejected.
fn parse_port(raw: &str) -> Option<u16> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port > 0)
}

fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" | "fatal" => Some(LevelFilter::Error),
        "silent" | "off" => Some(LevelFilter::Off),
        _ => None,
    }
}
