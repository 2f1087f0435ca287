use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::classify::{default_is_retryable, Classify};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default backoff unit.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default exclusive upper bound of the jitter term.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);

/// Shared retry predicate.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Why the executor stopped retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The predicate classified the error as terminal.
    NotRetryable,
    /// The failed attempt was the last one the budget allows.
    Exhausted,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; return the error.
    NoRetry(StopReason),
    /// Retry after the given backoff (before jitter).
    RetryAfter(Duration),
}

/// Retry parameters for one `execute()` call.
///
/// Built per call from [`RetryConfig::default`] (or [`RetryConfig::new`] for
/// error types without a [`Classify`] impl) and never mutated while a call is
/// running.
pub struct RetryConfig<E> {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Initial backoff unit.
    pub base_delay: Duration,
    /// Double the delay per attempt when true; constant `base_delay` otherwise.
    pub use_exponential_backoff: bool,
    /// Exclusive upper bound of the random term added to each delay.
    pub max_jitter: Duration,
    /// Whether a given failure should trigger another attempt.
    pub is_retryable: RetryPredicate<E>,
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            use_exponential_backoff: self.use_exponential_backoff,
            max_jitter: self.max_jitter,
            is_retryable: Arc::clone(&self.is_retryable),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("use_exponential_backoff", &self.use_exponential_backoff)
            .field("max_jitter", &self.max_jitter)
            .field("is_retryable", &"<predicate>")
            .finish()
    }
}

impl<E: Classify + 'static> Default for RetryConfig<E> {
    fn default() -> Self {
        Self::new(default_is_retryable::<E>)
    }
}

impl<E> RetryConfig<E> {
    /// Default parameters with a custom predicate.
    pub fn new<P>(is_retryable: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            use_exponential_backoff: true,
            max_jitter: DEFAULT_MAX_JITTER,
            is_retryable: Arc::new(is_retryable),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.use_exponential_backoff = enabled;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_predicate<P>(mut self, is_retryable: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Arc::new(is_retryable);
        self
    }

    /// Total number of times the operation may be invoked.
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Backoff before jitter for 0-based attempt index `attempt`:
    /// `base_delay * 2^attempt` when exponential, `base_delay` otherwise.
    /// Saturates at `Duration::MAX`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if !self.use_exponential_backoff {
            return self.base_delay;
        }
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// `[low, high)` bounds of the full delay (backoff plus jitter) slept
    /// after a failure at attempt index `attempt`.
    pub fn delay_window(&self, attempt: u32) -> (Duration, Duration) {
        let low = self.backoff(attempt);
        (low, low.saturating_add(self.max_jitter))
    }

    /// Decide what to do after attempt index `attempt` (0-based) failed with `err`.
    ///
    /// The predicate is consulted first, so a terminal error stops the loop on
    /// any attempt, including the first.
    pub fn decide(&self, attempt: u32, err: &E) -> RetryDecision {
        if !(self.is_retryable)(err) {
            return RetryDecision::NoRetry(StopReason::NotRetryable);
        }
        if attempt >= self.max_retries {
            return RetryDecision::NoRetry(StopReason::Exhausted);
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }
}

/// Partial configuration: only the fields that are set replace the base.
pub struct RetryOverrides<E> {
    pub max_retries: Option<u32>,
    pub base_delay: Option<Duration>,
    pub use_exponential_backoff: Option<bool>,
    pub max_jitter: Option<Duration>,
    pub is_retryable: Option<RetryPredicate<E>>,
}

impl<E> Default for RetryOverrides<E> {
    fn default() -> Self {
        Self {
            max_retries: None,
            base_delay: None,
            use_exponential_backoff: None,
            max_jitter: None,
            is_retryable: None,
        }
    }
}

impl<E> Clone for RetryOverrides<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            use_exponential_backoff: self.use_exponential_backoff,
            max_jitter: self.max_jitter,
            is_retryable: self.is_retryable.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryOverrides<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOverrides")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("use_exponential_backoff", &self.use_exponential_backoff)
            .field("max_jitter", &self.max_jitter)
            .field("is_retryable", &self.is_retryable.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

impl<E> RetryOverrides<E> {
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = Some(base_delay);
        self
    }

    pub fn exponential_backoff(mut self, enabled: bool) -> Self {
        self.use_exponential_backoff = Some(enabled);
        self
    }

    pub fn max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = Some(max_jitter);
        self
    }

    pub fn is_retryable<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: RetryOverrides<E>) -> Self {
        Self {
            max_retries: other.max_retries.or(self.max_retries),
            base_delay: other.base_delay.or(self.base_delay),
            use_exponential_backoff: other
                .use_exponential_backoff
                .or(self.use_exponential_backoff),
            max_jitter: other.max_jitter.or(self.max_jitter),
            is_retryable: other.is_retryable.or(self.is_retryable),
        }
    }

    /// Copy `base` and replace the fields set here. `base` is left untouched.
    pub fn apply(&self, base: &RetryConfig<E>) -> RetryConfig<E> {
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            base_delay: self.base_delay.unwrap_or(base.base_delay),
            use_exponential_backoff: self
                .use_exponential_backoff
                .unwrap_or(base.use_exponential_backoff),
            max_jitter: self.max_jitter.unwrap_or(base.max_jitter),
            is_retryable: self
                .is_retryable
                .clone()
                .unwrap_or_else(|| Arc::clone(&base.is_retryable)),
        }
    }
}
