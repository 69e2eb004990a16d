use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Defaults to `~/.content-automator/data/content.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_model_directories")]
    pub model_directories: Vec<PathBuf>,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Resolved database location. Falls back to the working directory when
    /// no home directory is known.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(crate::db::default_database_path)
            .unwrap_or_else(|| PathBuf::from("content.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            bind_address: default_bind_address(),
            database_path: None,
            model_directories: default_model_directories(),
            worker: WorkerConfig::default(),
            log: LogConfig::default(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model_directories() -> Vec<PathBuf> {
    ["models", "../models"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    /// Start the polling loop together with the server.
    #[serde(default = "default_true")]
    pub autostart: bool,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_error_backoff_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            autostart: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
