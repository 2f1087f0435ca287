//! `rex config` – show where the config lives and what it resolves to.

use anyhow::Result;
use rex_core::config::{self, RetrySettings, RexConfig};
use rex_core::retry::{RequestError, RetryConfig};

pub fn run_config(cfg: &RexConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("config file: {}", path.display());
    let effective = cfg
        .retry_overrides::<RequestError>()
        .apply(&RetryConfig::default());
    let resolved = RexConfig {
        retry: Some(RetrySettings::from_config(&effective)),
    };
    println!("effective settings:\n{}", resolved.to_toml()?);
    Ok(())
}
