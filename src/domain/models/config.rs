use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure for secops-mcp
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External process execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Executable path overrides keyed by tool binary name (e.g. `httpx`)
    #[serde(default)]
    pub binaries: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files. Stderr only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Execution bounds and scratch locations for external tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutionConfig {
    /// Bound applied to tools without a size-scaled bound
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Time between SIGTERM and SIGKILL when a bound is exceeded
    #[serde(default = "default_terminate_grace_ms")]
    pub terminate_grace_ms: u64,

    /// Directory for tool output that cannot go to stdout (sqlmap sessions)
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

const fn default_timeout_secs() -> u64 {
    600
}

const fn default_terminate_grace_ms() -> u64 {
    2000
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
            terminate_grace_ms: default_terminate_grace_ms(),
            scratch_dir: default_scratch_dir(),
        }
    }
}
