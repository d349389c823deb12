/// Server configuration, loaded from an optional JSON file plus environment overrides
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Runtime configuration for the API server.
///
/// Values come from (highest precedence first):
/// 1. Environment variables `PORT`, `DATABASE_PATH`, `LOG_LEVEL`
/// 2. The JSON config file, if one was given
/// 3. Defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub address: String,
    pub port: u16,
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 5000,
            database_path: PathBuf::from("courses.db"),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the given file (if any) and the process environment.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Applies overrides looked up by environment variable name.
    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.database_path.as_os_str().is_empty() {
            bail!("database_path must not be empty");
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn tracing_level(&self) -> anyhow::Result<Level> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log level: {}", self.log_level))
    }

    /// The `address:port` string to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
