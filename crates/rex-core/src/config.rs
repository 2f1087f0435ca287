use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{
    RetryConfig, RetryOverrides, DEFAULT_BASE_DELAY, DEFAULT_MAX_JITTER, DEFAULT_MAX_RETRIES,
};

/// Retry parameters (optional `[retry]` section in config.toml).
///
/// Every key is optional; missing keys fall back to the built-in template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Backoff unit in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
    /// Double the delay per attempt (true) or keep it constant (false).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_exponential_backoff: Option<bool>,
    /// Exclusive upper bound of the random jitter in milliseconds (0 = none).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_jitter_ms: Option<u64>,
}

impl RetrySettings {
    /// Settings with every key set to the template value.
    pub fn template() -> Self {
        Self {
            max_retries: Some(DEFAULT_MAX_RETRIES),
            base_delay_ms: Some(DEFAULT_BASE_DELAY.as_millis() as u64),
            use_exponential_backoff: Some(true),
            max_jitter_ms: Some(DEFAULT_MAX_JITTER.as_millis() as u64),
        }
    }

    /// Partial retry config carrying only the keys present here.
    pub fn to_overrides<E>(&self) -> RetryOverrides<E> {
        RetryOverrides {
            max_retries: self.max_retries,
            base_delay: self.base_delay_ms.map(Duration::from_millis),
            use_exponential_backoff: self.use_exponential_backoff,
            max_jitter: self.max_jitter_ms.map(Duration::from_millis),
            is_retryable: None,
        }
    }

    /// Fill every key from `config` (used to display the effective values).
    pub fn from_config<E>(config: &RetryConfig<E>) -> Self {
        Self {
            max_retries: Some(config.max_retries),
            base_delay_ms: Some(config.base_delay.as_millis() as u64),
            use_exponential_backoff: Some(config.use_exponential_backoff),
            max_jitter_ms: Some(config.max_jitter.as_millis() as u64),
        }
    }
}

/// Global configuration loaded from `~/.config/rex/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RexConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

impl RexConfig {
    /// Retry overrides from the file (empty when there is no `[retry]` section).
    pub fn retry_overrides<E>(&self) -> RetryOverrides<E> {
        self.retry
            .as_ref()
            .map(|settings| settings.to_overrides())
            .unwrap_or_default()
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rex")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`.
pub fn load_from_path(path: &Path) -> Result<RexConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: RexConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Write the default configuration (template retry section) to `path`.
pub fn write_default(path: &Path) -> Result<RexConfig> {
    let default_cfg = RexConfig {
        retry: Some(RetrySettings::template()),
    };
    let toml = default_cfg.to_toml()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    tracing::info!("created default config at {}", path.display());
    Ok(default_cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RexConfig> {
    let path = config_path()?;
    if !path.exists() {
        return write_default(&path);
    }
    load_from_path(&path)
}
