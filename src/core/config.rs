use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::actuator::HANDLERS;
use crate::tactile::{KeyRemapper, WatchdogTimer, DEFAULT_THRESHOLD};

pub const ENV_PREFIX: &str = "CROWDKEYS";
pub const CONFIG_PATH_VAR: &str = "CROWDKEYS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("missing session settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("watchdog needs a positive interval and miss limit")]
    InvalidWatchdog,

    #[error("unknown key handler '{0}' (expected one of: {})", HANDLERS.join(", "))]
    UnknownHandler(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub tactile: TactileConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub username: String,
    pub password: String,
    pub channel: String,
    pub api_base_url: String,
    /// Skips the join request and connects here directly.
    pub robot_url: Option<String>,
    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            channel: String::new(),
            api_base_url: "https://beam.pro/api/v1".to_string(),
            robot_url: None,
            reconnect_delay_ms: 1000,
            max_reconnect_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TactileConfig {
    pub threshold: f64,
    pub remap: bool,
    pub remap_table: HashMap<String, String>,
    pub handler: String,
    pub watchdog_interval_ms: u64,
    pub watchdog_miss_limit: u32,
}

impl Default for TactileConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            remap: false,
            remap_table: HashMap::new(),
            handler: "xdotool".to_string(),
            watchdog_interval_ms: 500,
            watchdog_miss_limit: 5,
        }
    }
}

impl TactileConfig {
    pub fn remapper(&self) -> KeyRemapper {
        KeyRemapper::new(self.remap, self.remap_table.clone())
    }

    pub fn watchdog(&self) -> WatchdogTimer {
        WatchdogTimer::new(
            Duration::from_millis(self.watchdog_interval_ms),
            self.watchdog_miss_limit,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Default filter; `CROWDKEYS_LOG` overrides it with full directives.
    pub log_level: String,
    pub log_format: LogFormat,
    pub health_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
            health_port: 3000,
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then `.env` and
    /// `CROWDKEYS_SECTION__FIELD` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        let missing: Vec<&'static str> = [
            ("username", session.username.is_empty()),
            ("password", session.password.is_empty()),
            ("channel", session.channel.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let threshold = self.tactile.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        if self.tactile.watchdog_interval_ms == 0 || self.tactile.watchdog_miss_limit == 0 {
            return Err(ConfigError::InvalidWatchdog);
        }

        if !HANDLERS.contains(&self.tactile.handler.as_str()) {
            return Err(ConfigError::UnknownHandler(self.tactile.handler.clone()));
        }

        Ok(())
    }
}
