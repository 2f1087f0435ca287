//! Retry notifications.
//!
//! The executor calls [`RetryObserver::on_retry`] once per scheduled retry,
//! just before sleeping. Hosts route these events to their own logging or
//! telemetry; the default observer does nothing.

use std::fmt::Display;
use std::time::Duration;

/// Receives one event per scheduled retry.
pub trait RetryObserver<E>: Send + Sync {
    /// `attempt` is the 1-based number of the attempt that just failed,
    /// `delay` the full sleep (backoff plus jitter) before the next one.
    fn on_retry(&self, attempt: u32, delay: Duration, error: &E);
}

impl<E, F> RetryObserver<E> for F
where
    F: Fn(u32, Duration, &E) + Send + Sync,
{
    fn on_retry(&self, attempt: u32, delay: Duration, error: &E) {
        self(attempt, delay, error)
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<E> RetryObserver<E> for NoopObserver {
    fn on_retry(&self, _attempt: u32, _delay: Duration, _error: &E) {}
}

/// Observer that emits a `tracing` warning per retry.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    /// `label` names the operation in log lines.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl<E: Display> RetryObserver<E> for TracingObserver {
    fn on_retry(&self, attempt: u32, delay: Duration, error: &E) {
        tracing::warn!(
            operation = %self.label,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "attempt failed, retrying"
        );
    }
}
