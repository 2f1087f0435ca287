//! Resilient-operation executor: re-attempts failing async operations with
//! exponential backoff, jitter, a retry predicate and optional cancellation.

pub mod config;
pub mod logging;
pub mod retry;
