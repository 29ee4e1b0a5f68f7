use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;
use url::Url;

pub const DEFAULT_CHAIN_READ_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_DB_POOL_SIZE: usize = 5;

/// Server configuration, loaded from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub log_level: String,
    /// RPC endpoint per chain id.
    pub chains: HashMap<u64, String>,
    #[serde(default = "default_chain_read_timeout_seconds")]
    pub chain_read_timeout_seconds: u64,
    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: usize,
}

fn default_chain_read_timeout_seconds() -> u64 {
    DEFAULT_CHAIN_READ_TIMEOUT_SECONDS
}

fn default_db_pool_size() -> usize {
    DEFAULT_DB_POOL_SIZE
}

/// Failures while loading or interpreting the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("Failed to parse log level: {0}")]
    LogLevelParseError(String),
}

impl From<ConfigError> for crate::error::ServerError {
    fn from(e: ConfigError) -> Self {
        crate::error::ServerError::ConfigError(e.to_string())
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(data)?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevelParseError(self.log_level.clone()))
    }

    pub fn rpc_urls(&self) -> Result<HashMap<u64, Url>, ConfigError> {
        self.chains
            .iter()
            .map(|(chain_id, url)| Ok((*chain_id, Url::parse(url)?)))
            .collect()
    }

    pub fn chain_read_timeout(&self) -> Duration {
        Duration::from_secs(self.chain_read_timeout_seconds)
    }
}
