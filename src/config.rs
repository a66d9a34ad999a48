//! Service configuration.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults (match the original deployment: `127.0.0.1:5000`).
//! 2. A TOML file, `wqmon.toml` or the path in `WQMON_CONFIG`. A missing file
//!    is not an error; a malformed one is.
//! 3. Environment variables, including any loaded from `.env`.
//!
//! # Environment overrides
//! `WQMON_HOST`, `WQMON_PORT`, `WQMON_WORKERS`, `WQMON_MODEL_PATH`,
//! `WQMON_MODEL_URL`, `WQMON_LOG_LEVEL`, `WQMON_LOG_FILE`.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogLevel;

/// Config file used when `WQMON_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "wqmon.toml";

/// Where the exported decision tree is expected by default.
pub const DEFAULT_MODEL_PATH: &str = "model/model_decision_tree_lobster.json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The config file is not valid TOML for this schema.
    ParseError(String),
    /// A setting has an unusable value.
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid config value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of request-handling threads.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Exported decision tree (JSON).
    pub path: Option<PathBuf>,
    /// Base URL of a prediction sidecar. Takes precedence over `path`.
    pub remote_url: Option<String>,
    /// Request timeout for the sidecar.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_MODEL_PATH)),
            remote_url: None,
            timeout_secs: 5,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, falling back to defaults if it does not exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    /// Full layered load: `.env`, config file, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = std::env::var("WQMON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_file(Path::new(&path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `WQMON_*` overrides read through `lookup`.
    ///
    /// Taking the lookup as a parameter keeps tests independent of the real
    /// process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("WQMON_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("WQMON_PORT") {
            self.server.port = parse_setting("WQMON_PORT", &port)?;
        }
        if let Some(workers) = lookup("WQMON_WORKERS") {
            self.server.workers = parse_setting("WQMON_WORKERS", &workers)?;
        }
        if let Some(path) = lookup("WQMON_MODEL_PATH") {
            // An empty value disables the local model.
            self.model.path = (!path.trim().is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(url) = lookup("WQMON_MODEL_URL") {
            self.model.remote_url = (!url.trim().is_empty()).then_some(url);
        }
        if let Some(level) = lookup("WQMON_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = lookup("WQMON_LOG_FILE") {
            self.logging.file = (!file.trim().is_empty()).then_some(file);
        }
        self.validate()
    }

    /// Checks settings that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.workers".into(),
                value: "0".into(),
            });
        }
        if self.model.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "model.timeout_secs".into(),
                value: "0".into(),
            });
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging
            .level
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "logging.level".into(),
                value: self.logging.level.clone(),
            })
    }

    /// `host:port` for the listening socket.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
