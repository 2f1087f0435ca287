//! `rex schedule` – print the backoff windows the current settings produce.

use anyhow::Result;
use rex_core::config::RexConfig;
use rex_core::retry::{RequestError, RetryConfig};
use std::io::{self, Write};
use std::time::Duration;

use crate::cli::RetryArgs;

/// One retry in the schedule: the delay slept before retry `retry` lies in `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRow {
    pub retry: u32,
    pub low: Duration,
    pub high: Duration,
}

/// Template ← config file ← flags.
pub fn effective_config(cfg: &RexConfig, retry: &RetryArgs) -> RetryConfig<RequestError> {
    cfg.retry_overrides()
        .merge(retry.to_overrides())
        .apply(&RetryConfig::default())
}

/// Lazily yields one row per retry; nothing is buffered, so huge budgets are fine.
pub fn schedule_rows<E>(config: &RetryConfig<E>) -> impl Iterator<Item = ScheduleRow> + '_ {
    (0..config.max_retries).map(move |attempt| {
        let (low, high) = config.delay_window(attempt);
        ScheduleRow {
            retry: attempt + 1,
            low,
            high,
        }
    })
}

/// Rows past this many are folded into a single summary line.
pub const MAX_SHOWN_ROWS: usize = 32;

pub fn write_schedule<E>(config: &RetryConfig<E>, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "max attempts: {} ({} retries), backoff: {}",
        config.max_attempts(),
        config.max_retries,
        if config.use_exponential_backoff {
            "exponential"
        } else {
            "constant"
        }
    )?;
    if config.max_retries == 0 {
        writeln!(out, "no retries: the operation runs once")?;
        return Ok(());
    }
    writeln!(out, "  {:>6}  {:>14}  {:>14}", "Retry", "Min delay(ms)", "Max delay(ms)")?;
    writeln!(out, "  {}  {}  {}", "------", "--------------", "--------------")?;
    for row in schedule_rows(config).take(MAX_SHOWN_ROWS) {
        writeln!(
            out,
            "  {:>6}  {:>14}  {:>14}",
            row.retry,
            row.low.as_millis(),
            row.high.as_millis()
        )?;
    }
    let hidden = u64::from(config.max_retries).saturating_sub(MAX_SHOWN_ROWS as u64);
    if hidden > 0 {
        let (low, high) = config.delay_window(config.max_retries - 1);
        writeln!(
            out,
            "  ... {} more retries, the last waiting {}-{} ms",
            hidden,
            low.as_millis(),
            high.as_millis()
        )?;
    }
    Ok(())
}

pub fn run_schedule(cfg: &RexConfig, retry: &RetryArgs) -> Result<()> {
    let config = effective_config(cfg, retry);
    write_schedule(&config, &mut io::stdout().lock())?;
    Ok(())
}
