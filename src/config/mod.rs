//! Configuration — loads optional ~/.miniclef/config.yaml.

pub mod set;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::event::DEFAULT_BPM;
use crate::osc::OscConfig;

pub use set::{EffectSpec, PatternSpec, RepeatSpec, SetFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Settings for the `miniclef` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Starting tempo in BPM.
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Synth server address.
    #[serde(default)]
    pub osc: OscConfig,
    /// Directory of synth definitions to load at startup.
    #[serde(default)]
    pub synthdef_dir: Option<PathBuf>,
    /// Longest the scheduler sleeps between ticks.
    #[serde(default = "default_max_sleep_ms")]
    pub max_sleep_ms: u64,
    /// Fixed seed for random choices.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_tempo() -> f64 {
    DEFAULT_BPM
}

fn default_max_sleep_ms() -> u64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            osc: OscConfig::default(),
            synthdef_dir: None,
            max_sleep_ms: default_max_sleep_ms(),
            seed: None,
        }
    }
}

impl Config {
    /// ~/.miniclef/config.yaml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".miniclef").join("config.yaml"))
    }

    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = read(path)?;
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when there
    /// is no home directory or no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn max_sleep(&self) -> Duration {
        Duration::from_millis(self.max_sleep_ms)
    }
}

pub(crate) fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
