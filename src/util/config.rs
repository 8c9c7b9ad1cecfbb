//! Application configuration: defaults, then `config.json` in the platform
//! config directory, then `FREIGHT_DESK_*` environment variables.

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::Duration,
};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::infra::poller::DEFAULT_POLL_INTERVAL;
use crate::util::persistence::config_dir;

const CONFIG_FILE: &str = "config.json";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8091/";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_API_URL: &str = "FREIGHT_DESK_API_URL";
const ENV_POLL_SECS: &str = "FREIGHT_DESK_POLL_SECS";
const ENV_PAGE_SIZE: &str = "FREIGHT_DESK_PAGE_SIZE";
const ENV_LOG: &str = "FREIGHT_DESK_LOG";

static CURRENT: OnceLock<AppConfig> = OnceLock::new();

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub page_size: u32,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    log_level: Option<String>,
}

impl AppConfig {
    /// Loads from the platform config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_dir().map(|dir| dir.join(CONFIG_FILE));
        Self::load_from(path.as_deref(), |key| env::var(key).ok())
    }

    pub fn load_from(
        path: Option<&Path>,
        read_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path.filter(|path| path.exists()) {
            config.apply_file(read_file(path)?);
        }
        config.apply_env(read_env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(size) = file.page_size {
            self.page_size = size;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
    }

    fn apply_env(&mut self, read_env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let read = |key: &str| read_env(key).map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = read(ENV_API_URL) {
            self.api_base_url = value;
        }
        if let Some(value) = read(ENV_POLL_SECS) {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_POLL_SECS,
                value: value.clone(),
            })?;
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(value) = read(ENV_PAGE_SIZE) {
            self.page_size = value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PAGE_SIZE,
                value: value.clone(),
            })?;
        }
        if let Some(value) = read(ENV_LOG) {
            self.log_level = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api_base_url).map_err(|_| ConfigError::InvalidValue {
            key: "api_base_url",
            value: self.api_base_url.clone(),
        })?;
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid(
                "page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Makes `config` the process-wide configuration. Only the first call wins.
pub fn install(config: AppConfig) {
    if CURRENT.set(config).is_err() {
        tracing::warn!("configuration already installed; ignoring");
    }
}

pub fn current() -> &'static AppConfig {
    CURRENT.get_or_init(AppConfig::default)
}
