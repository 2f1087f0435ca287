//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::classify::Classify;
use super::error::Cancelled;
use super::observer::{NoopObserver, RetryObserver};
use super::policy::{RetryConfig, RetryDecision, RetryOverrides};
use super::sleep::{JitterSource, Sleeper, TokioSleeper, UniformJitter};

/// Drives the attempt loop for one configuration.
///
/// Attempts run strictly one after another. The executor holds no per-call
/// state, so one instance can serve any number of concurrent `execute` calls.
pub struct RetryExecutor<E> {
    config: RetryConfig<E>,
    observer: Arc<dyn RetryObserver<E>>,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl<E: 'static> RetryExecutor<E> {
    /// Executor with a no-op observer, the tokio timer and uniform jitter.
    pub fn new(config: RetryConfig<E>) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(UniformJitter),
        }
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver<E> + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn with_jitter<J>(mut self, jitter: J) -> Self
    where
        J: JitterSource + 'static,
    {
        self.jitter = Arc::new(jitter);
        self
    }

    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned unchanged.
    ///
    /// `op` must be safe to invoke more than once. There is no per-attempt
    /// timeout; wrap `op` in `tokio::time::timeout` if it can hang.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(op, None).await
    }

    /// Like [`execute`](Self::execute), but checks `cancel` before every
    /// attempt and while sleeping between attempts. A cancelled run returns
    /// `E::from(Cancelled)` without consulting the retry predicate.
    pub async fn execute_cancellable<T, F, Fut>(
        &self,
        op: F,
        cancel: &CancellationToken,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Cancelled>,
    {
        let on_cancel: fn() -> E = cancelled_error::<E>;
        self.drive(op, Some((cancel, on_cancel))).await
    }

    async fn drive<T, F, Fut>(
        &self,
        mut op: F,
        cancel: Option<(&CancellationToken, fn() -> E)>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            if let Some((token, cancelled)) = cancel {
                if token.is_cancelled() {
                    tracing::debug!(attempt = attempt_number(attempt), "cancelled before attempt");
                    return Err(cancelled());
                }
            }

            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            attempts = attempt_number(attempt),
                            "operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            match self.config.decide(attempt, &err) {
                RetryDecision::NoRetry(reason) => {
                    tracing::debug!(attempts = attempt_number(attempt), ?reason, "giving up");
                    return Err(err);
                }
                RetryDecision::RetryAfter(backoff) => {
                    let delay = backoff.saturating_add(self.jitter.sample(self.config.max_jitter));
                    self.observer.on_retry(attempt + 1, delay, &err);
                    let sleep = self.sleeper.sleep(delay);
                    match cancel {
                        Some((token, cancelled)) => {
                            tokio::select! {
                                _ = token.cancelled() => {
                                    tracing::debug!(
                                        attempt = attempt_number(attempt),
                                        "cancelled during backoff"
                                    );
                                    return Err(cancelled());
                                }
                                _ = sleep => {}
                            }
                        }
                        None => sleep.await,
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// 1-based attempt number; widened so `u32::MAX` retries still count.
fn attempt_number(attempt: u32) -> u64 {
    u64::from(attempt) + 1
}

fn cancelled_error<E: From<Cancelled>>() -> E {
    E::from(Cancelled)
}

/// Run `op` with `overrides` layered over the default template.
pub async fn retry<T, E, F, Fut>(op: F, overrides: RetryOverrides<E>) -> Result<T, E>
where
    E: Classify + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryExecutor::new(overrides.apply(&RetryConfig::default()))
        .execute(op)
        .await
}
