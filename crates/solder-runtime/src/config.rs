//! Bootstrap configuration.
//!
//! Configuration is assembled with figment from three layers, later layers
//! winning: built-in defaults, a `solder.toml` file in the working
//! directory, and `SOLDER_*` environment variables (nested keys separated by
//! `__`, e.g. `SOLDER_LOGGING__LEVEL=debug`).

use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "solder.toml";

/// Everything the runtime needs to boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Platform API token. Required; never logged.
    pub token: String,

    /// Optional HTTP proxy URL handed to the API client.
    pub proxy: Option<String>,

    /// Long-poll timeout in seconds.
    pub poll_timeout_secs: u64,

    /// Maximum updates fetched per poll.
    pub poll_limit: u32,

    /// Upper bound on concurrently dispatched events. `None` trusts the
    /// upstream rate.
    pub max_in_flight: Option<usize>,

    pub logging: LoggingConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            proxy: None,
            poll_timeout_secs: 60,
            poll_limit: 100,
            max_in_flight: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive; overridden by `RUST_LOG` when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BotConfig {
    /// The figment this crate extracts from; exposed so embedders can merge
    /// their own providers on top.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(BotConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("SOLDER_").split("__"))
    }

    /// Loads and validates the configuration.
    pub fn load() -> Result<Self, RuntimeError> {
        let config: BotConfig = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants not expressible in the schema.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.token.is_empty() {
            return Err(RuntimeError::MissingToken);
        }
        Ok(())
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}
