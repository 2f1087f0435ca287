//! Retry flags shared by `run` and `schedule`.

use clap::Args;
use rex_core::retry::RetryOverrides;
use std::time::Duration;

/// Command-line retry overrides; layered over the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RetryArgs {
    /// Retries after the first attempt.
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Backoff unit in milliseconds.
    #[arg(long, value_name = "MS")]
    pub base_delay_ms: Option<u64>,

    /// Keep the delay constant instead of doubling it per retry.
    #[arg(long)]
    pub constant: bool,

    /// Exclusive upper bound of the random jitter in milliseconds (0 disables jitter).
    #[arg(long, value_name = "MS")]
    pub max_jitter_ms: Option<u64>,
}

impl RetryArgs {
    pub fn to_overrides<E>(&self) -> RetryOverrides<E> {
        let mut overrides = RetryOverrides::default();
        overrides.max_retries = self.max_retries;
        overrides.base_delay = self.base_delay_ms.map(Duration::from_millis);
        overrides.max_jitter = self.max_jitter_ms.map(Duration::from_millis);
        if self.constant {
            overrides.use_exponential_backoff = Some(false);
        }
        overrides
    }
}
