//! Application configuration.
//!
//! The API key comes from `ALPHAVANTAGE_API_KEY` when set, otherwise from a TOML
//! file given by `--config` or `API_KEYS_CONFIG_PATH`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fairvalue::{ALPHA_VANTAGE_BASE_URL, MOCK_BASE_URL};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::RunArgs;

/// Environment variable holding the Alpha Vantage API key.
pub(crate) const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// Configuration error types
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("config file not found at path: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("{}", missing_api_key_message(.0.as_deref()))]
    MissingApiKey(Option<PathBuf>),
}

fn missing_api_key_message(path: Option<&Path>) -> String {
    let file_hint = match path {
        Some(path) => format!("or by adding it to your config file at '{}'", path.display()),
        None => "or by adding it to a TOML file passed with --config or API_KEYS_CONFIG_PATH"
            .to_string(),
    };
    format!(
        "alphavantage API key is missing.\n\
         You can provide it either via the {API_KEY_ENV} environment variable (recommended for production),\n\
         {file_hint} like this:\n\n\
         alphavantage = \"YOUR_API_KEY_HERE\""
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub(crate) const fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Keys file layout.
#[derive(Debug, Default, Deserialize)]
struct ApiKeysFile {
    #[serde(default)]
    alphavantage: String,
}

/// Settings for a `run` invocation.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) log_level: LogLevel,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Build the configuration from the process environment and `run` arguments.
    pub(crate) fn load(args: &RunArgs, log_level: LogLevel) -> Result<Self, ConfigError> {
        Self::from_parts(std::env::var(API_KEY_ENV).ok(), args, log_level)
    }

    fn from_parts(
        env_api_key: Option<String>,
        args: &RunArgs,
        log_level: LogLevel,
    ) -> Result<Self, ConfigError> {
        let api_key = resolve_api_key(env_api_key, args.config.as_deref())?;
        let base_url = if args.mock_api {
            MOCK_BASE_URL
        } else {
            ALPHA_VANTAGE_BASE_URL
        };

        Ok(Self {
            api_key,
            base_url: base_url.to_string(),
            output_dir: args.output_dir.clone(),
            log_level,
        })
    }

    pub(crate) fn uses_mock_api(&self) -> bool {
        self.base_url == MOCK_BASE_URL
    }
}

/// Pick the API key from the environment value, falling back to the keys file.
pub(crate) fn resolve_api_key(
    env_value: Option<String>,
    config_path: Option<&Path>,
) -> Result<String, ConfigError> {
    if let Some(key) = env_value.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        return Ok(key);
    }

    let Some(path) = config_path else {
        return Err(ConfigError::MissingApiKey(None));
    };
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::FileError(format!("{}: {e}", path.display())))?;
    let keys = parse_api_keys(&contents)?;

    let key = keys.alphavantage.trim();
    if key.is_empty() {
        return Err(ConfigError::MissingApiKey(Some(path.to_path_buf())));
    }
    Ok(key.to_string())
}

fn parse_api_keys(contents: &str) -> Result<ApiKeysFile, ConfigError> {
    toml::from_str(contents)
        .map_err(|e| ConfigError::FileError(format!("error decoding TOML file: {e}")))
}
