//! Serializable run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendscope_core::{CoreError, StrategyParams};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<CoreError> for ConfigError {
    fn from(e: CoreError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// Everything needed to reproduce one analysis run.
///
/// ```toml
/// [data]
/// symbol = "SPY"
/// path = "data/SPY.csv"
///
/// [strategy]
/// short_window = 50
/// long_window = 200
///
/// [output]
/// dir = "results"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub data: DataConfig,

    /// Omitted keys fall back to `StrategyParams::default()`.
    #[serde(default)]
    pub strategy: StrategyParams,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the bars for the run come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    pub symbol: String,
    /// A CSV file, or a directory holding `<SYMBOL>.csv`.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Artifact directory. No artifacts are written when absent.
    pub dir: Option<PathBuf>,
}

impl RunConfig {
    /// Build a config for one symbol with default strategy parameters.
    pub fn new(symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig {
                symbol: symbol.into(),
                path: path.into(),
            },
            strategy: StrategyParams::default(),
            output: OutputConfig::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("data.symbol must not be empty".into()));
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Deterministic BLAKE3 hex digest of the configuration.
    ///
    /// Two runs with identical configs share a RunId. The output directory
    /// does not affect what is computed and is left out of the hash.
    pub fn run_id(&self) -> RunId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.data.symbol.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.data.path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        let s = &self.strategy;
        for window in [s.short_window, s.long_window, s.rsi_window] {
            hasher.update(&(window as u64).to_le_bytes());
        }
        hasher.update(&s.initial_capital.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
