//! Configuration management for Peerstate
//!
//! Settings come from defaults, an optional TOML file and `PEERSTATE_*`
//! environment variables, in that order of precedence (later wins).

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "peerstate.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "PEERSTATE_CONFIG";

/// Default size of the merge worker pool
pub const DEFAULT_WORKER_COUNT: usize = 20;

/// Upper bound on the merge worker pool
pub const MAX_WORKER_COUNT: usize = 1024;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Merge engine tuning
    pub engine: EngineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Merge engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of partitioned merge workers (0 = one per CPU)
    pub worker_count: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any) and environment variables
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            // An explicitly named file must exist
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            Err(_) => Config::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply `PEERSTATE_*` overrides using the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup("PEERSTATE_WORKERS") {
            self.engine.worker_count = workers.trim().parse()
                .map_err(|e| Error::config(format!("Invalid worker count: {}", e)))?;
        }

        if let Some(level) = lookup("PEERSTATE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("PEERSTATE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.engine.worker_count > MAX_WORKER_COUNT {
            return Err(Error::config(format!(
                "Too many merge workers (maximum {})",
                MAX_WORKER_COUNT
            )));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level: {}", other))),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => return Err(Error::config(format!("Invalid log format: {}", other))),
        }

        Ok(())
    }

    /// Number of merge workers to start
    pub fn effective_worker_count(&self) -> usize {
        if self.engine.worker_count == 0 {
            // Auto-detect: use number of CPU cores
            num_cpus::get().max(1)
        } else {
            self.engine.worker_count
        }
    }
}
