//! `rex run -- <program> [args...]` – re-run a program until it exits 0.

use anyhow::{Context, Result};
use rex_core::config::RexConfig;
use rex_core::retry::{Cancelled, RetryConfig, RetryExecutor, RetryObserver};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::cli::RetryArgs;

/// Exit code reported when the run is interrupted with Ctrl-C.
const EXIT_CANCELLED: i32 = 130;

/// Outcome of one failed child run, used for retry classification.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started.
    Spawn(io::Error),
    /// The program exited with a non-zero code.
    Exit(i32),
    /// The program was terminated by a signal.
    Signal,
    /// Ctrl-C was received before an attempt or during backoff.
    Cancelled,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn(e) => write!(f, "failed to start: {}", e),
            CommandError::Exit(code) => write!(f, "exit code {}", code),
            CommandError::Signal => write!(f, "terminated by signal"),
            CommandError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Cancelled> for CommandError {
    fn from(_: Cancelled) -> Self {
        CommandError::Cancelled
    }
}

/// Non-zero exits are retried (only the listed codes when `retry_on_exit` is
/// non-empty). Spawn failures and signals are terminal.
pub fn is_retryable(err: &CommandError, retry_on_exit: &[i32]) -> bool {
    match err {
        CommandError::Exit(code) => retry_on_exit.is_empty() || retry_on_exit.contains(code),
        CommandError::Spawn(_) | CommandError::Signal | CommandError::Cancelled => false,
    }
}

/// Prints one line per retry to stderr and mirrors it into the log.
struct StderrObserver {
    program: String,
    max_retries: u32,
}

impl RetryObserver<CommandError> for StderrObserver {
    fn on_retry(&self, attempt: u32, delay: Duration, error: &CommandError) {
        tracing::warn!(
            program = %self.program,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "command failed, retrying"
        );
        eprintln!(
            "rex: {} failed ({}); retry {}/{} in {} ms",
            self.program,
            error,
            attempt,
            self.max_retries,
            delay.as_millis()
        );
    }
}

async fn run_once(program: &str, args: &[String]) -> Result<(), CommandError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(CommandError::Spawn)?;
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(CommandError::Exit(code)),
        None => Err(CommandError::Signal),
    }
}

pub async fn run_command(
    cfg: &RexConfig,
    retry: &RetryArgs,
    retry_on_exit: Vec<i32>,
    command: &[String],
) -> Result<i32> {
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let code = run_with_cancel(cfg, retry, retry_on_exit, command, &cancel).await;
    ctrl_c.abort();
    code
}

/// Run `command` through the executor until it succeeds, fails terminally,
/// exhausts its retries or `cancel` fires. Returns the exit code for `rex`.
pub async fn run_with_cancel(
    cfg: &RexConfig,
    retry: &RetryArgs,
    retry_on_exit: Vec<i32>,
    command: &[String],
    cancel: &CancellationToken,
) -> Result<i32> {
    let (program, args) = command.split_first().context("missing program to run")?;

    let template = RetryConfig::new(move |e: &CommandError| is_retryable(e, &retry_on_exit));
    let config = cfg
        .retry_overrides()
        .merge(retry.to_overrides())
        .apply(&template);
    tracing::info!(program = %program, ?config, "running command");

    let observer = StderrObserver {
        program: program.clone(),
        max_retries: config.max_retries,
    };
    let executor = RetryExecutor::new(config).with_observer(observer);

    let outcome = executor
        .execute_cancellable(|| run_once(program, args), cancel)
        .await;

    match outcome {
        Ok(()) => Ok(0),
        // Ctrl-C also reaches the child, which then dies by signal or exits
        // non-zero; that failure is the cancellation.
        Err(err) if cancel.is_cancelled() => {
            tracing::info!(program = %program, error = %err, "run cancelled");
            Ok(EXIT_CANCELLED)
        }
        Err(CommandError::Exit(code)) => Ok(code),
        Err(CommandError::Signal) => Ok(1),
        Err(CommandError::Cancelled) => Ok(EXIT_CANCELLED),
        Err(CommandError::Spawn(e)) => {
            Err(e).with_context(|| format!("failed to start {}", program))
        }
    }
}
