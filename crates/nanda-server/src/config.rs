//! Server configuration.
//!
//! [`ServerConfig`] starts from built-in defaults, then overlays an optional
//! config file and `NANDA_*` environment variables. Nested keys use a double
//! underscore, e.g. `NANDA_SCORING__HALF_LIFE_DAYS=14`. Command-line flags are
//! applied on top by the binary.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, Environment, File};
use nanda_core::types::ScoringConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const ENV_PREFIX: &str = "NANDA";

/// Where computed scores are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rocksdb,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Rocksdb => f.write_str("rocksdb"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::Rocksdb),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address for the HTTP listener.
    pub bind: String,
    pub port: u16,
    /// Root directory for persistent data.
    pub data_dir: PathBuf,
    /// Log level filter string (e.g. "info", "nanda_server=debug").
    pub log_level: String,
    pub store: StoreBackend,
    /// Base URL of the remote metrics service. `None` serves fixtures only.
    pub metrics_endpoint: Option<String>,
    pub enable_cors: bool,
    /// History length returned when a request names no limit.
    pub history_limit: usize,
    pub scoring: ScoringConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nanda");

        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            data_dir,
            log_level: "info".to_string(),
            store: StoreBackend::Memory,
            metrics_endpoint: None,
            enable_cors: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            scoring: ScoringConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, then `path` (if given), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads variables from `env` instead of
    /// the process environment when provided.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ServerError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.scoring.validate()?;
        Ok(cfg)
    }

    /// Socket address string for the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Path to the RocksDB score database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("scores")
    }
}
