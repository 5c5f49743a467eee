//! Configuration for the hot-reload watcher.
//!
//! Layered: defaults, then `mapfresh.toml` in the working directory, then
//! environment variables.
//!
//! # Environment Variables
//!
//! Variables are prefixed with `MAPFRESH_`; double underscores separate
//! nested levels:
//! - `MAPFRESH_ENABLED=false` disables the watch loop
//! - `MAPFRESH_POLL_INTERVAL_SECONDS=10` slows the sweep
//! - `MAPFRESH_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Name of the optional configuration file, resolved against the working
/// directory.
const CONFIG_FILE: &str = "mapfresh.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Whether the watch loop runs at all. When false the watcher exits
    /// before priming.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between poll sweeps. Also used as the startup grace delay
    /// before the first sweep.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level filter.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `watcher = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}
fn default_poll_interval_seconds() -> u64 {
    3
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: default_poll_interval_seconds(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("MAPFRESH_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".") // Double underscore becomes dot
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// The sweep interval (and startup grace delay) as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}
