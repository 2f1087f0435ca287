//! `rex run` against real child processes (`sh`), with zero backoff.

use crate::cli::commands::{run_command, run_with_cancel};
use crate::cli::RetryArgs;
use rex_core::config::RexConfig;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn fast_retries(max_retries: u32) -> RetryArgs {
    RetryArgs {
        max_retries: Some(max_retries),
        base_delay_ms: Some(0),
        max_jitter_ms: Some(0),
        ..RetryArgs::default()
    }
}

/// `sh -c <script>` with `$1` bound to `log`; the script appends one line per run.
fn counted_sh(script: &str, log: &Path) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        format!("echo run >> \"$1\"; {}", script),
        "sh".to_string(),
        log.display().to_string(),
    ]
}

fn runs(log: &Path) -> usize {
    fs::read_to_string(log)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn exit_code_mirrors_last_failure_after_all_retries() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let code = run_command(
        &RexConfig::default(),
        &fast_retries(2),
        Vec::new(),
        &counted_sh("exit 3", &log),
    )
    .await
    .unwrap();
    assert_eq!(code, 3);
    assert_eq!(runs(&log), 3);
}

#[tokio::test]
async fn success_exits_zero_without_retrying() {
    let code = run_command(
        &RexConfig::default(),
        &fast_retries(2),
        Vec::new(),
        &["true".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(code, 0);
}

#[tokio::test]
async fn recovers_once_the_program_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let script = "[ $(wc -l < \"$1\") -ge 2 ]";
    let code = run_command(
        &RexConfig::default(),
        &fast_retries(5),
        Vec::new(),
        &counted_sh(script, &log),
    )
    .await
    .unwrap();
    assert_eq!(code, 0);
    assert_eq!(runs(&log), 2);
}

#[tokio::test]
async fn unlisted_exit_code_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let code = run_command(
        &RexConfig::default(),
        &fast_retries(3),
        vec![75],
        &counted_sh("exit 4", &log),
    )
    .await
    .unwrap();
    assert_eq!(code, 4);
    assert_eq!(runs(&log), 1);
}

#[tokio::test]
async fn missing_program_is_an_error() {
    let err = run_command(
        &RexConfig::default(),
        &fast_retries(3),
        Vec::new(),
        &["rex-test-no-such-program".to_string()],
    )
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("failed to start rex-test-no-such-program"));
}

#[tokio::test]
async fn killed_by_signal_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let code = run_command(
        &RexConfig::default(),
        &fast_retries(3),
        Vec::new(),
        &counted_sh("kill -TERM $$", &log),
    )
    .await
    .unwrap();
    assert_eq!(code, 1);
    assert_eq!(runs(&log), 1);
}

#[tokio::test]
async fn cancel_while_child_runs_exits_130() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    // The child outlives the cancellation, then dies by signal as it would on Ctrl-C.
    let code = run_with_cancel(
        &RexConfig::default(),
        &fast_retries(3),
        Vec::new(),
        &counted_sh("sleep 0.5; kill -TERM $$", &log),
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(code, 130);
    assert_eq!(runs(&log), 1);
}

#[tokio::test]
async fn cancel_during_backoff_exits_130() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("runs.log");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });
    let retry = RetryArgs {
        base_delay_ms: Some(60_000),
        ..fast_retries(3)
    };
    let code = run_with_cancel(
        &RexConfig::default(),
        &retry,
        Vec::new(),
        &counted_sh("exit 1", &log),
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(code, 130);
    assert_eq!(runs(&log), 1);
}
