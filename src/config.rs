//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional settings file
//! (any format the `config` crate recognises by extension), then environment
//! variables prefixed with `CLUSTERWATCH_`, then command-line flags applied by
//! the binary.
//!
//! ```toml
//! endpoint = "http://localhost:1887"
//! adapter = "mixnet"
//! statistics_interval_ms = 5000
//! connect_interval_ms = 5000
//! history = 60
//! lang = "lang/en_us.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::DEFAULT_HISTORY_SIZE;
use crate::source::{DEFAULT_CONNECT_INTERVAL, MIN_STATISTICS_INTERVAL};

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "CLUSTERWATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the console backend.
    pub endpoint: String,
    /// Adapter whose nodes are watched.
    pub adapter: String,
    pub statistics_interval_ms: u64,
    pub connect_interval_ms: u64,
    /// Snapshots kept per node.
    pub history: usize,
    /// External language pack; the built-in English pack when unset.
    pub lang: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1887".to_string(),
            adapter: "mixnet".to_string(),
            statistics_interval_ms: MIN_STATISTICS_INTERVAL.as_millis() as u64,
            connect_interval_ms: DEFAULT_CONNECT_INTERVAL.as_millis() as u64,
            history: DEFAULT_HISTORY_SIZE,
            lang: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config = builder.build().context("Failed to load settings")?;
        let settings: Self = config.try_deserialize().context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pollers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.connect_interval_ms == 0 {
            bail!("connect_interval_ms must be greater than zero");
        }
        if self.history == 0 {
            bail!("history must keep at least one snapshot");
        }
        Ok(())
    }

    pub fn statistics_interval(&self) -> Duration {
        Duration::from_millis(self.statistics_interval_ms)
    }

    pub fn connect_interval(&self) -> Duration {
        Duration::from_millis(self.connect_interval_ms)
    }
}
