// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Root configuration loaded from `config.yaml`.
///
/// Every section is optional. A missing file at the default path means
/// "run with defaults"; CLI flags override individual values afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
///
/// server:
///   addr: 127.0.0.1:8787
///   name: mcp-exec
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Name advertised by `GET /`.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            name: default_name(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Interpreter settings.
///
/// executor:
///   python: python3
///   builtins: restricted
///   timeout_ms: 5000
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default)]
    pub builtins: BuiltinsProfile,

    /// Hard limit on a single execution. Unset means no limit.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            builtins: BuiltinsProfile::default(),
            timeout_ms: None,
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn default_python() -> String {
    "python3".to_string()
}

/// Which builtins the evaluation namespace exposes.
///
/// Neither profile is a sandbox: submitted code runs with the privileges of
/// the server process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinsProfile {
    #[default]
    Restricted,
    Full,
}

impl BuiltinsProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinsProfile::Restricted => "restricted",
            BuiltinsProfile::Full => "full",
        }
    }
}

/// streaming:
///   heartbeat_interval_ms: 1000
#[derive(Debug, Clone, Deserialize)]
pub struct StreamingConfig {
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_interval_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_ms(),
        }
    }
}

impl StreamingConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }
}

fn default_heartbeat_ms() -> u64 {
    1000
}

/// logging:
///   level: info
///   format: json
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Config {
    /// Load and parse `config.yaml` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&raw)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// Only used for the implicit default path; an explicitly passed
    /// config file that does not exist is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(raw).context("Failed to parse YAML config")
    }
}
