//! Retry and backoff policy.
//!
//! This module encapsulates error classification (no response, 5xx, terminal
//! 4xx), exponential backoff with jitter and the attempt loop itself, so that
//! every caller shares one consistent policy.

mod classify;
mod error;
mod observer;
mod policy;
mod run;
mod sleep;

pub use classify::{classify_io_error, default_is_retryable, Classify, ErrorKind};
pub use error::{Cancelled, RequestError};
pub use observer::{NoopObserver, RetryObserver, TracingObserver};
pub use policy::{
    RetryConfig, RetryDecision, RetryOverrides, RetryPredicate, StopReason, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_JITTER, DEFAULT_MAX_RETRIES,
};
pub use run::{retry, RetryExecutor};
pub use sleep::{JitterSource, NoJitter, SleepFuture, Sleeper, TokioSleeper, UniformJitter};
