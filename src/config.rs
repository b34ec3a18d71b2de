//! Workload configuration, loaded from TOML.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable naming an optional config file for the binary.
pub const CONFIG_ENV: &str = "INSERT_STRINGS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Buffer capacity.
    pub capacity: usize,
    /// Total items produced across all producers.
    pub target_count: usize,
    /// Number of concurrent producer threads.
    pub producer_count: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 10,
            target_count: 30,
            producer_count: 3,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the file named by [`CONFIG_ENV`], or fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject zero sizes and unknown log levels before any thread starts.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if self.target_count == 0 {
            return Err(Error::ZeroTargetCount);
        }
        if self.producer_count == 0 {
            return Err(Error::ZeroProducerCount);
        }
        self.level().map(|_| ())
    }

    pub fn level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| Error::InvalidLogLevel(self.log_level.clone()))
    }
}
